//! Cloudinary account configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLOUDINARY_API_URL, DEFAULT_CLOUDINARY_DELIVERY_HOST, DEFAULT_STOCK_IMAGE_PREFIX,
    DEFAULT_USER_UPLOAD_TAG,
};

fn default_secure() -> bool {
    true
}

fn default_delivery_host() -> String {
    DEFAULT_CLOUDINARY_DELIVERY_HOST.to_string()
}

fn default_api_url() -> String {
    DEFAULT_CLOUDINARY_API_URL.to_string()
}

fn default_upload_tag() -> String {
    DEFAULT_USER_UPLOAD_TAG.to_string()
}

fn default_stock_prefix() -> String {
    DEFAULT_STOCK_IMAGE_PREFIX.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    /// Cloud name, the first path segment of every delivery URL
    pub cloud_name: String,

    pub api_key: String,

    pub api_secret: String,

    /// Build `https` delivery URLs (default: true)
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Delivery host (default: res.cloudinary.com)
    #[serde(default = "default_delivery_host")]
    pub delivery_host: String,

    /// Upload/admin API base URL (default: https://api.cloudinary.com/v1_1)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Tag attached to user uploads so they can be pruned (default: user-upload)
    #[serde(default = "default_upload_tag")]
    pub upload_tag: String,

    /// Folder holding the stock image library (default: stock/)
    #[serde(default = "default_stock_prefix")]
    pub stock_prefix: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("secure", &self.secure)
            .field("delivery_host", &self.delivery_host)
            .field("api_url", &self.api_url)
            .field("upload_tag", &self.upload_tag)
            .field("stock_prefix", &self.stock_prefix)
            .finish()
    }
}
