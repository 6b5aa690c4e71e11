//! Bridge and bucket configuration.

use crate::error::{BridgeError, BridgeResult};
use crate::types::BasicAuth;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bridge endpoint.
pub const DEFAULT_BRIDGE_URL: &str = "https://api.storj.io";

/// Default number of concurrent upload tasks.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Remote storage settings for one backup job.
///
/// `email` and `password` are only read when the local key has not been
/// registered yet.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorjConfig {
    /// Bucket id uploads go to.
    pub bucket: String,

    /// Remote directory prefix (normalized to `/dir/` before use).
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Passphrase protecting the local keyring.
    pub keypass: String,

    /// Upper bound on concurrently running upload tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
}

fn default_destination() -> String {
    "/".to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

impl StorjConfig {
    /// Creates a config with defaults for everything but the required fields.
    pub fn new(bucket: impl Into<String>, keypass: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            destination: default_destination(),
            keypass: keypass.into(),
            concurrency: DEFAULT_CONCURRENCY,
            email: None,
            password: None,
            bridge_url: default_bridge_url(),
        }
    }

    /// Checks the fields the pipeline can't run without.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(BridgeError::Config("storj.bucket must not be empty".into()));
        }
        if self.keypass.is_empty() {
            return Err(BridgeError::Config("storj.keypass must not be empty".into()));
        }
        if self.concurrency == 0 {
            return Err(BridgeError::Config(
                "storj.concurrency must be at least 1".into(),
            ));
        }
        if !self.bridge_url.starts_with("http://") && !self.bridge_url.starts_with("https://") {
            return Err(BridgeError::Config(format!(
                "storj.bridge_url is not an http(s) URL: {}",
                self.bridge_url
            )));
        }
        Ok(())
    }

    /// Account credentials for key registration, when both are present.
    pub fn basic_auth(&self) -> Option<BasicAuth> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !email.is_empty() => {
                Some(BasicAuth::new(email.clone(), password.clone()))
            }
            _ => None,
        }
    }

    /// Remote path an archive named `file_name` is stored under.
    pub fn destination_file(&self, file_name: &str) -> String {
        format!("{}{file_name}", normalize_destination(&self.destination))
    }
}

impl fmt::Debug for StorjConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorjConfig")
            .field("bucket", &self.bucket)
            .field("destination", &self.destination)
            .field("keypass", &"<redacted>")
            .field("concurrency", &self.concurrency)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("bridge_url", &self.bridge_url)
            .finish()
    }
}

/// Makes sure a destination starts and ends with `/`.
pub fn normalize_destination(destination: &str) -> String {
    let mut out = String::with_capacity(destination.len() + 2);
    if !destination.starts_with('/') {
        out.push('/');
    }
    out.push_str(destination);
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}
