//! Cloudinary integration
//!
//! Two halves with very different costs:
//!
//! - [`CloudinaryUrlBuilder`] renders a transform pipeline into a delivery
//!   URL. Pure string work; the meme engine calls it on every caption.
//! - [`CloudinaryClient`] talks to the upload and admin REST APIs. The bot
//!   only needs the narrow [`ImageHost`] view of it; the maintenance
//!   commands use the listing and delete calls directly.

use async_trait::async_trait;

pub mod client;
pub mod error;
pub mod resources;
pub mod url;

pub use client::{api_signature, CloudinaryClient};
pub use error::ImageHostError;
pub use resources::{
    expired_public_ids, format_stock_choices, stock_image_ids, DeleteResult, Resource,
    ResourcePage, UploadedImage,
};
pub use url::CloudinaryUrlBuilder;

/// Image storage as seen from the chat handler
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store the image at `source_url`, tagged as a user upload
    async fn upload_image(&self, source_url: &str) -> Result<UploadedImage, ImageHostError>;

    /// Names of the stock images, without their folder prefix, sorted
    async fn stock_images(&self) -> Result<Vec<String>, ImageHostError>;
}
