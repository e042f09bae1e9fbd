//! Meme caption engine
//!
//! Turns a base image identifier and up to two captions into an ordered
//! transformation pipeline, then hands the pipeline to a [`UrlBuilder`] that
//! renders it as a URL for the image service.
//!
//! # Pipeline
//!
//! ```text
//! [resize w=500] → [top caption]? → [bottom caption]? → [watermark if any caption]
//! ```
//!
//! Everything here is pure and synchronous: the same inputs always produce
//! the same URL, and nothing touches the network or the clock.
//!
//! # Example
//!
//! ```
//! use memebot::cloudinary::CloudinaryUrlBuilder;
//! use memebot::meme::{MemeGenerator, MemeStyle};
//!
//! let generator = MemeGenerator::new(CloudinaryUrlBuilder::new("demo"), MemeStyle::default());
//! let url = generator.meme_url("abc123", None, None);
//! assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/w_500/abc123");
//! ```

pub mod config;
pub mod font;
pub mod layout;
pub mod params;

pub use config::MemeStyle;
pub use font::{border_width, font_cap, font_size, MIN_FONT_SIZE};
pub use layout::{build_pipeline, caption_transform, encode_caption, watermark_transform};
pub use params::{
    Border, CaptionPosition, CropMode, FontWeight, Gravity, ImageTransform, MemeRequest,
    TextAlign, TextOverlay, DEFAULT_POSITION,
};

/// Renders a transformation pipeline applied to a stored image as a URL
pub trait UrlBuilder: Send + Sync {
    fn build_url(&self, public_id: &str, pipeline: &[ImageTransform]) -> String;
}

impl<T: UrlBuilder + ?Sized> UrlBuilder for std::sync::Arc<T> {
    fn build_url(&self, public_id: &str, pipeline: &[ImageTransform]) -> String {
        (**self).build_url(public_id, pipeline)
    }
}

/// Build the pipeline for the given captions and return the builder's URL verbatim.
///
/// `base_image_id` must be non-empty; callers check this before asking for a
/// meme. Missing and zero-length captions are equivalent.
pub fn compute_meme_url(
    builder: &dyn UrlBuilder,
    style: &MemeStyle,
    base_image_id: &str,
    top_text: Option<&str>,
    bottom_text: Option<&str>,
) -> String {
    let request = MemeRequest::new(base_image_id)
        .with_top(top_text)
        .with_bottom(bottom_text);
    let pipeline = build_pipeline(&request, style);

    tracing::debug!(
        public_id = base_image_id,
        steps = pipeline.len(),
        transforms = %serde_json::to_string(&pipeline).unwrap_or_default(),
        "Computed meme transforms"
    );

    builder.build_url(base_image_id, &pipeline)
}

/// A URL builder paired with the layout it renders
#[derive(Debug, Clone)]
pub struct MemeGenerator<B> {
    builder: B,
    style: MemeStyle,
}

impl<B: UrlBuilder> MemeGenerator<B> {
    pub fn new(builder: B, style: MemeStyle) -> Self {
        Self { builder, style }
    }

    pub fn style(&self) -> &MemeStyle {
        &self.style
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// See [`compute_meme_url`]
    pub fn meme_url(
        &self,
        base_image_id: &str,
        top_text: Option<&str>,
        bottom_text: Option<&str>,
    ) -> String {
        compute_meme_url(
            &self.builder,
            &self.style,
            base_image_id,
            top_text,
            bottom_text,
        )
    }

    /// The pipeline `meme_url` would render, without building a URL
    pub fn pipeline(
        &self,
        base_image_id: &str,
        top_text: Option<&str>,
        bottom_text: Option<&str>,
    ) -> Vec<ImageTransform> {
        let request = MemeRequest::new(base_image_id)
            .with_top(top_text)
            .with_bottom(bottom_text);
        build_pipeline(&request, &self.style)
    }
}
