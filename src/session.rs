//! Sliding admin sessions.
//!
//! A session is created after a login token is redeemed and lives in
//! `data/sessions.json` as a digest keyed record, same scheme as the token
//! store. Each successful check pushes the expiry forward by the configured
//! lifetime, so a session only dies after a full lifetime of inactivity.
//! Expired sessions are destroyed on the check that finds them.

use crate::datafile::{DataFileError, JsonDocument};
use crate::token::{digest, random_token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub created_at: i64,
    pub expires_at: i64,
}

type SessionMap = BTreeMap<String, SessionRecord>;

#[derive(Debug, Clone)]
pub struct SessionStore {
    doc: JsonDocument,
    lifetime: i64,
}

impl SessionStore {
    pub fn new(doc: JsonDocument, lifetime: i64) -> Self {
        Self { doc, lifetime }
    }

    /// Open a new session and return its plaintext token.
    pub fn create(&self, now: i64) -> Result<String, DataFileError> {
        let token = random_token();
        let key = digest(&token);
        let lifetime = self.lifetime;
        self.doc.update::<SessionMap, _, _>(|sessions| {
            sessions.retain(|_, record| record.expires_at > now);
            sessions.insert(
                key,
                SessionRecord {
                    created_at: now,
                    expires_at: now + lifetime,
                },
            );
        })?;
        Ok(token)
    }

    /// Whether the session is live. A hit slides the expiry forward; an
    /// expired or unknown session reports false, expired ones are removed.
    pub fn check(&self, token: &str, now: i64) -> Result<bool, DataFileError> {
        let key = digest(token);
        let lifetime = self.lifetime;
        self.doc.update::<SessionMap, _, _>(|sessions| {
            match sessions.get_mut(&key) {
                Some(record) if record.expires_at > now => {
                    record.expires_at = now + lifetime;
                    true
                }
                Some(_) => {
                    sessions.remove(&key);
                    false
                }
                None => false,
            }
        })
    }

    /// Log out. Destroying an unknown session is not an error.
    pub fn destroy(&self, token: &str) -> Result<(), DataFileError> {
        let key = digest(token);
        self.doc.update::<SessionMap, _, _>(|sessions| {
            sessions.remove(&key);
        })
    }
}
