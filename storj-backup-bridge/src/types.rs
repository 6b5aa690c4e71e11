//! Shared types for bridge operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Account credentials used once, to register a public key.
#[derive(Clone)]
pub struct BasicAuth {
    pub email: String,
    password: String,
}

impl BasicAuth {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }

    /// The bridge never sees the plain password, only its hex SHA-256.
    pub fn hashed_password(&self) -> String {
        hex::encode(Sha256::digest(self.password.as_bytes()))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Bucket token operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenOperation {
    Push,
    Pull,
}

impl TokenOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenOperation::Push => "PUSH",
            TokenOperation::Pull => "PULL",
        }
    }
}

/// Short-lived token authorizing one operation on a bucket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BucketToken {
    pub token: String,
    pub bucket: String,
    pub operation: TokenOperation,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// File record returned by the bridge after a successful store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    pub mimetype: String,
    pub size: u64,
}
