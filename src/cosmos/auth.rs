//! Master-key request signing
//!
//! Every Cosmos REST request carries an `authorization` header holding an
//! HMAC-SHA256 signature of the verb, resource type, resource link and
//! request date, keyed by the base64-decoded account key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::error::ServiceError;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_TYPE: &str = "master";
const TOKEN_VERSION: &str = "1.0";

/// Decoded account key, ready to sign requests
#[derive(Clone)]
pub struct MasterKey {
    mac: HmacSha256,
}

impl MasterKey {
    /// Decode a base64 account key
    pub fn from_base64(key: &str) -> Result<Self, ServiceError> {
        let bytes = STANDARD
            .decode(key.trim())
            .map_err(|e| ServiceError::InvalidKey(e.to_string()))?;
        let mac = HmacSha256::new_from_slice(&bytes)
            .map_err(|e| ServiceError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Base64 signature for one request
    pub fn signature(&self, verb: &str, resource_type: &str, resource_link: &str, date: &str) -> String {
        let payload = string_to_sign(verb, resource_type, resource_link, date);
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// URL-encoded `authorization` header value for one request
    pub fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> String {
        let token = format!(
            "type={}&ver={}&sig={}",
            TOKEN_TYPE,
            TOKEN_VERSION,
            self.signature(verb, resource_type, resource_link, date)
        );
        urlencoding::encode(&token).into_owned()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// Verb, resource type and date are lowercased; the resource link keeps its
/// case since ids are case sensitive.
fn string_to_sign(verb: &str, resource_type: &str, resource_link: &str, date: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    )
}

/// `x-ms-date` header value (RFC 1123, always GMT)
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
