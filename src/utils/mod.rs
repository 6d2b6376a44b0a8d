pub mod image;
pub mod time;
pub mod token;
