//! HTTP client for the storage bridge.
//!
//! The pipeline only depends on the [`BridgeApi`] trait; [`BridgeClient`]
//! is the reqwest implementation. Key registration uses HTTP basic auth,
//! everything after that is signed with the registered keypair.

use crate::error::{BridgeError, BridgeResult};
use crate::types::*;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use storj_backup_crypto::KeyPair;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

/// Remote operations the backup pipeline needs from the bridge.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Registers `public_key` (hex) with the account behind `auth`.
    async fn add_public_key(&self, auth: &BasicAuth, public_key: &str) -> BridgeResult<()>;

    /// Requests a token for `operation` on `bucket`.
    async fn create_token(
        &self,
        keypair: &KeyPair,
        bucket: &str,
        operation: TokenOperation,
    ) -> BridgeResult<BucketToken>;

    /// Uploads the file at `path` into `bucket` under `file_name`.
    async fn store_file_in_bucket(
        &self,
        bucket: &str,
        token: &str,
        path: &Path,
        file_name: &str,
    ) -> BridgeResult<UploadedFile>;
}

/// Connect timeout for every request, and the overall timeout for the
/// small JSON calls. Uploads have no overall timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed bridge client.
pub struct BridgeClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> BridgeResult<Self> {
        let client = Client::builder().connect_timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Overrides the timeout applied to key registration and token requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bucket_path(bucket: &str, suffix: &str) -> String {
        format!("/buckets/{}/{suffix}", urlencoding::encode(bucket))
    }

    /// Builds a POST whose JSON body carries a nonce and is signed as
    /// `METHOD\nPATH\nBODY`.
    fn signed_post(
        &self,
        keypair: &KeyPair,
        path: &str,
        mut body: serde_json::Value,
    ) -> BridgeResult<RequestBuilder> {
        body["__nonce"] = serde_json::Value::String(Uuid::new_v4().to_string());
        let payload = serde_json::to_string(&body)?;
        let signature = keypair.sign_hex(format!("POST\n{path}\n{payload}").as_bytes());

        Ok(self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("x-pubkey", keypair.public_hex())
            .header("x-signature", signature)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.request_timeout)
            .body(payload))
    }

    /// Maps non-success responses to bridge errors, preferring the
    /// `{"error": ...}` message the bridge sends when it has one.
    async fn check(resp: Response) -> BridgeResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(BridgeError::AuthFailed(format!("{status}: {message}")))
        } else {
            Err(BridgeError::Api(format!("{status}: {message}")))
        }
    }
}

#[async_trait]
impl BridgeApi for BridgeClient {
    async fn add_public_key(&self, auth: &BasicAuth, public_key: &str) -> BridgeResult<()> {
        let url = format!("{}/keys", self.base_url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&auth.email, Some(auth.hashed_password()))
            .timeout(self.request_timeout)
            .json(&serde_json::json!({ "key": public_key }))
            .send()
            .await?;

        Self::check(resp).await?;
        debug!("registered public key {public_key}");
        Ok(())
    }

    async fn create_token(
        &self,
        keypair: &KeyPair,
        bucket: &str,
        operation: TokenOperation,
    ) -> BridgeResult<BucketToken> {
        let path = Self::bucket_path(bucket, "tokens");
        let resp = self
            .signed_post(
                keypair,
                &path,
                serde_json::json!({ "operation": operation.as_str() }),
            )?
            .send()
            .await?;

        let token: BucketToken = Self::check(resp).await?.json().await?;
        debug!("obtained {} token for bucket {bucket}", operation.as_str());
        Ok(token)
    }

    async fn store_file_in_bucket(
        &self,
        bucket: &str,
        token: &str,
        path: &Path,
        file_name: &str,
    ) -> BridgeResult<UploadedFile> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let url = format!("{}{}", self.base_url, Self::bucket_path(bucket, "files"));

        let resp = self
            .client
            .post(&url)
            .header("x-token", token)
            .header("x-filename", file_name)
            .header("x-filesize", size.to_string())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let file: UploadedFile = Self::check(resp).await?.json().await?;
        debug!("stored {size} bytes in bucket {bucket} as {}", file.id);
        Ok(file)
    }
}
