use crate::config::StorageConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const PUBLIC_READ_ACL: &str = "public-read";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-acl;x-amz-content-sha256;x-amz-date";

/// Client for an S3-compatible bucket using path-style addressing.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    config: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub amz_date: String,
    pub payload_hash: String,
    pub authorization: String,
}

impl StorageService {
    pub fn new(config: StorageConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn public_base_url(&self) -> &str {
        &self.config.public_base_url
    }

    pub fn object_url(&self, key: &str) -> Result<Url> {
        let raw = format!("{}/{}/{}", self.config.endpoint, self.config.bucket, key);
        Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid storage endpoint: {}", e)))
    }

    /// Uploads `body` under `key` with a public-read ACL. No retries.
    pub async fn put_public_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let url = self.object_url(key)?;
        let signed = sign_put(&self.config, &url, &body, content_type, Utc::now())?;

        let resp = self
            .client
            .put(url)
            .header("content-type", content_type)
            .header("x-amz-acl", PUBLIC_READ_ACL)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Object storage returned status {}: {}",
                status.as_u16(),
                txt
            )));
        }
        Ok(())
    }
}

/// AWS Signature Version 4 for a single-chunk PUT.
pub fn sign_put(
    config: &StorageConfig,
    url: &Url,
    body: &[u8],
    content_type: &str,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = hex::encode(Sha256::digest(body));
    let host = host_header(url)?;

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-acl:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        content_type, host, PUBLIC_READ_ACL, payload_hash, amz_date
    );
    let canonical_request = format!(
        "PUT\n{}\n\n{}\n{}\n{}",
        url.path(),
        canonical_headers,
        SIGNED_HEADERS,
        payload_hash
    );

    let scope = format!("{}/{}/s3/aws4_request", date_stamp, config.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(&config.secret_access_key, &date_stamp, &config.region)?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);
    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        config.access_key_id, scope, SIGNED_HEADERS, signature
    );

    Ok(SignedRequest {
        amz_date,
        payload_hash,
        authorization,
    })
}

fn signing_key(secret: &str, date_stamp: &str, region: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::Config(format!("Invalid signing key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::Config("Storage endpoint has no host".to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config(endpoint: &str) -> StorageConfig {
        StorageConfig {
            endpoint: endpoint.to_string(),
            bucket: "calendar-assets".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            public_base_url: format!("{}/calendar-assets", endpoint),
            timeout_secs: 5,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn authorization_header_names_scope_and_headers() {
        let config = test_config("https://s3.us-east-1.amazonaws.com");
        let service = StorageService::new(config.clone(), Client::new());
        let url = service.object_url("abc.png").unwrap();
        assert_eq!(url.path(), "/calendar-assets/abc.png");

        let signed = sign_put(&config, &url, b"", "image/png", fixed_now()).unwrap();
        assert_eq!(signed.amz_date, "20240101T100000Z");
        assert_eq!(
            signed.payload_hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request, \
             SignedHeaders=content-type;host;x-amz-acl;x-amz-content-sha256;x-amz-date, Signature="
        ));
        let signature = signed.authorization.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn signature_is_deterministic_and_covers_the_body() {
        let config = test_config("http://127.0.0.1:9000");
        let url = Url::parse("http://127.0.0.1:9000/calendar-assets/abc.png").unwrap();
        let a = sign_put(&config, &url, b"one", "image/png", fixed_now()).unwrap();
        let b = sign_put(&config, &url, b"one", "image/png", fixed_now()).unwrap();
        let c = sign_put(&config, &url, b"two", "image/png", fixed_now()).unwrap();
        assert_eq!(a.authorization, b.authorization);
        assert_ne!(a.authorization, c.authorization);
    }

    #[test]
    fn host_header_keeps_non_default_ports() {
        let url = Url::parse("http://127.0.0.1:9000/bucket/key").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:9000");
        let url = Url::parse("https://s3.amazonaws.com/bucket/key").unwrap();
        assert_eq!(host_header(&url).unwrap(), "s3.amazonaws.com");
    }
}
