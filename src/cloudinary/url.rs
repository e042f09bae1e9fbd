//! Delivery URL rendering
//!
//! ```text
//! https://res.cloudinary.com/{cloud}/image/upload/{step}/{step}/.../{public_id}
//! ```
//!
//! Each step is a comma-joined list of `key_value` pairs sorted by key, the
//! same canonical form the Cloudinary SDKs produce, so identical pipelines
//! always hit the same derived-image cache entry.

use crate::config::CloudinaryConfig;
use crate::constants::DEFAULT_CLOUDINARY_DELIVERY_HOST;
use crate::meme::{FontWeight, ImageTransform, TextOverlay, UrlBuilder};

/// Builds delivery URLs for one Cloudinary cloud
#[derive(Debug, Clone)]
pub struct CloudinaryUrlBuilder {
    cloud_name: String,
    delivery_host: String,
    secure: bool,
}

impl CloudinaryUrlBuilder {
    /// HTTPS builder on the default delivery host
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            delivery_host: DEFAULT_CLOUDINARY_DELIVERY_HOST.to_string(),
            secure: true,
        }
    }

    pub fn from_config(config: &CloudinaryConfig) -> Self {
        Self {
            cloud_name: config.cloud_name.clone(),
            delivery_host: config.delivery_host.clone(),
            secure: config.secure,
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_delivery_host(mut self, host: impl Into<String>) -> Self {
        self.delivery_host = host.into();
        self
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }
}

impl UrlBuilder for CloudinaryUrlBuilder {
    fn build_url(&self, public_id: &str, pipeline: &[ImageTransform]) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let mut url = format!(
            "{}://{}/{}/image/upload/",
            scheme, self.delivery_host, self.cloud_name
        );

        for step in pipeline.iter().filter(|s| !s.is_empty()) {
            url.push_str(&transformation_component(step));
            url.push('/');
        }

        url.push_str(public_id);
        url
    }
}

/// Serialize one pipeline step, e.g. `c_fit,g_north,w_480`
pub fn transformation_component(step: &ImageTransform) -> String {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(border) = &step.border {
        params.push(("bo", border.to_string()));
    }
    if let Some(crop) = step.crop {
        params.push(("c", crop.as_str().to_string()));
    }
    if let Some(color) = &step.color {
        params.push(("co", normalize_color(color)));
    }
    if let Some(gravity) = step.gravity {
        params.push(("g", gravity.as_str().to_string()));
    }
    if let Some(overlay) = &step.overlay {
        params.push(("l", text_layer(overlay)));
    }
    if let Some(width) = step.width {
        params.push(("w", width.to_string()));
    }
    if let Some(x) = step.x {
        params.push(("x", x.to_string()));
    }
    if let Some(y) = step.y {
        params.push(("y", y.to_string()));
    }

    params.sort_by(|a, b| a.0.cmp(b.0));
    params
        .iter()
        .map(|(key, value)| format!("{}_{}", key, value))
        .collect::<Vec<_>>()
        .join(",")
}

/// `text:{family}_{size}[_bold][_{align}][_stroke]:{text}`
pub fn text_layer(overlay: &TextOverlay) -> String {
    let mut style = format!("{}_{}", overlay.font_family, overlay.font_size);
    if overlay.font_weight == FontWeight::Bold {
        style.push_str("_bold");
    }
    if let Some(align) = overlay.text_align {
        style.push('_');
        style.push_str(align.as_str());
    }
    if overlay.stroke {
        style.push_str("_stroke");
    }
    format!("text:{}:{}", style, escape_layer_text(&overlay.text))
}

/// Commas and slashes split transformations even when percent-encoded once,
/// so the layer text carries them escaped a second time.
fn escape_layer_text(text: &str) -> String {
    text.replace("%2C", "%252C").replace("%2F", "%252F")
}

/// Hex colors use the `rgb:` prefix, named colors pass through
fn normalize_color(color: &str) -> String {
    match color.strip_prefix('#') {
        Some(hex) => format!("rgb:{}", hex),
        None => color.to_string(),
    }
}
