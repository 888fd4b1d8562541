//! Single-use login tokens.
//!
//! `request-login` issues a random token, mails it as part of a login URL,
//! and stores only its SHA-256 digest in `data/tokens.json`. Verification
//! hashes the presented token, looks the digest up, and removes the entry in
//! the same locked update, so a token can never be redeemed twice even when
//! two requests race. Expired entries are pruned on every issue.

use crate::datafile::{DataFileError, JsonDocument};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    #[error(transparent)]
    Data(#[from] DataFileError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub created_at: i64,
    pub expires_at: i64,
}

type TokenMap = BTreeMap<String, TokenRecord>;

/// Store of outstanding login tokens, keyed by digest.
#[derive(Debug, Clone)]
pub struct TokenStore {
    doc: JsonDocument,
}

impl TokenStore {
    pub fn new(doc: JsonDocument) -> Self {
        Self { doc }
    }

    /// Issue a fresh token valid for `ttl` seconds and return its plaintext.
    /// Only the digest is persisted; the plaintext exists in the login URL
    /// and nowhere else.
    pub fn issue(&self, now: i64, ttl: i64) -> Result<String, AuthError> {
        let token = random_token();
        let digest = digest(&token);
        self.doc.update::<TokenMap, _, _>(|tokens| {
            tokens.retain(|_, record| record.expires_at > now);
            tokens.insert(
                digest,
                TokenRecord {
                    created_at: now,
                    expires_at: now + ttl,
                },
            );
        })?;
        Ok(token)
    }

    /// Redeem a token. The entry is removed whether it turns out valid or
    /// expired; only an unknown token leaves the store untouched.
    pub fn verify(&self, token: &str, now: i64) -> Result<(), AuthError> {
        let digest = digest(token);
        let taken = self
            .doc
            .update::<TokenMap, _, _>(|tokens| tokens.remove(&digest))?;
        match taken {
            None => Err(AuthError::InvalidToken),
            Some(record) if record.expires_at <= now => Err(AuthError::ExpiredToken),
            Some(_) => Ok(()),
        }
    }

    /// Number of unexpired tokens currently outstanding.
    pub fn outstanding(&self, now: i64) -> Result<usize, AuthError> {
        let tokens: TokenMap = self.doc.read()?;
        Ok(tokens.values().filter(|r| r.expires_at > now).count())
    }
}

/// 32 random bytes, hex encoded.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
