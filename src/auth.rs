//! Stateless admin credentials.
//!
//! A token is `<expires-unix-seconds>.<hex HMAC-SHA256(secret, expires)>`.
//! Nothing is kept server side; a token is valid while its signature matches
//! and its expiry lies in the future.

use chrono::{DateTime, Duration, Utc};
use hmac::{digest::InvalidLength, Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Admin login is disabled")]
    Disabled,

    #[error("Invalid password")]
    BadPassword,

    #[error("Missing admin token")]
    MissingToken,

    #[error("Invalid admin token")]
    InvalidToken,

    #[error("Admin token has expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: u64) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret.as_ref())?,
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        })
    }

    pub fn issue(&self) -> AdminToken {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> AdminToken {
        let expires_at = now + self.ttl;
        let expires = expires_at.timestamp().to_string();
        let signature = hex::encode(self.sign(expires.as_bytes()));

        AdminToken {
            token: format!("{expires}.{signature}"),
            expires_at: DateTime::from_timestamp(expires_at.timestamp(), 0).unwrap_or(expires_at),
        }
    }

    /// Returns the token's expiry if it is authentic and still live.
    pub fn verify(&self, token: &str) -> Result<DateTime<Utc>, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, AuthError> {
        let (expires, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = hex::decode(signature).map_err(|_| AuthError::InvalidToken)?;

        self.mac
            .clone()
            .chain_update(expires)
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let expires_at = expires
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(AuthError::InvalidToken)?;

        if expires_at <= now {
            return Err(AuthError::Expired);
        }

        Ok(expires_at)
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.mac.clone().chain_update(message).finalize().into_bytes().to_vec()
    }
}

/// Password check and token signing for the admin area.
///
/// Only the MAC of the password is kept, and candidates are compared by MAC,
/// so the comparison takes the same time whatever their length.
pub struct AdminAuth {
    password_mac: Vec<u8>,
    pub signer: TokenSigner,
}

impl AdminAuth {
    pub fn new(password: &str, signer: TokenSigner) -> Self {
        Self {
            password_mac: signer.sign(password.as_bytes()),
            signer,
        }
    }

    pub fn login(&self, password: &str) -> Result<AdminToken, AuthError> {
        self.signer
            .mac
            .clone()
            .chain_update(password)
            .verify_slice(&self.password_mac)
            .map_err(|_| AuthError::BadPassword)?;

        Ok(self.signer.issue())
    }
}
