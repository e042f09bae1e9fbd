//! Upload and admin API client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

use super::error::ImageHostError;
use super::resources::{stock_image_ids, DeleteResult, ResourcePage, UploadedImage};
use super::ImageHost;
use crate::config::CloudinaryConfig;
use crate::constants::STOCK_IMAGE_LIST_LIMIT;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Signature over the upload parameters.
///
/// Parameters are sorted by name, joined as `k=v` with `&`, the API secret
/// is appended and the whole string is hashed with SHA-256.
pub fn api_signature(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Talks to the Cloudinary REST API for one cloud
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageHostError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ImageHostError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.cloud_name,
            path
        )
    }

    /// Upload a remote image by URL
    pub async fn upload_from_url(
        &self,
        source_url: &str,
        tags: &[&str],
    ) -> Result<UploadedImage, ImageHostError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let tags = tags.join(",");
        let mut params = BTreeMap::new();
        params.insert("tags", tags.clone());
        params.insert("timestamp", timestamp.clone());
        let signature = api_signature(&params, &self.config.api_secret);

        let form = [
            ("file", source_url),
            ("tags", tags.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        tracing::debug!(source_url = %source_url, "Uploading image");
        let response = self
            .http
            .post(self.endpoint("image/upload"))
            .form(&form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List uploaded images whose public id starts with `prefix`
    pub async fn list_by_prefix(
        &self,
        prefix: &str,
        max_results: u32,
    ) -> Result<ResourcePage, ImageHostError> {
        let query = [
            ("type", "upload".to_string()),
            ("prefix", prefix.to_string()),
            ("max_results", max_results.to_string()),
        ];
        self.admin_get("resources/image/upload", &query).await
    }

    /// One page of images carrying `tag`
    pub async fn list_by_tag(
        &self,
        tag: &str,
        max_results: u32,
        cursor: Option<&str>,
    ) -> Result<ResourcePage, ImageHostError> {
        let mut query = vec![("max_results", max_results.to_string())];
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor.to_string()));
        }
        let path = format!("resources/image/tags/{}", urlencoding::encode(tag));
        self.admin_get(&path, &query).await
    }

    /// One page of every image in the cloud
    pub async fn list_all(&self, cursor: Option<&str>) -> Result<ResourcePage, ImageHostError> {
        let mut query = Vec::new();
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor.to_string()));
        }
        self.admin_get("resources/image", &query).await
    }

    /// Delete uploaded images by public id
    pub async fn delete_resources(
        &self,
        public_ids: &[String],
    ) -> Result<DeleteResult, ImageHostError> {
        if public_ids.is_empty() {
            return Ok(DeleteResult::default());
        }
        let query: Vec<(&str, &str)> = public_ids
            .iter()
            .map(|id| ("public_ids[]", id.as_str()))
            .collect();
        let response = self
            .http
            .delete(self.endpoint("resources/image/upload"))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(&query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn admin_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ImageHostError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ImageHostError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ImageHostError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload_image(&self, source_url: &str) -> Result<UploadedImage, ImageHostError> {
        self.upload_from_url(source_url, &[self.config.upload_tag.as_str()])
            .await
    }

    async fn stock_images(&self) -> Result<Vec<String>, ImageHostError> {
        let page = self
            .list_by_prefix(&self.config.stock_prefix, STOCK_IMAGE_LIST_LIMIT)
            .await?;
        Ok(stock_image_ids(&page.resources, &self.config.stock_prefix))
    }
}
