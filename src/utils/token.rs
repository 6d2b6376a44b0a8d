use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const SALT_LENGTH: usize = 16;

/// Random lowercase alphanumeric name used for uploaded objects.
pub fn generate_salt(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_has_requested_length_and_charset() {
        let salt = generate_salt(SALT_LENGTH);
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
