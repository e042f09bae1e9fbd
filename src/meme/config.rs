use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CAPTION_FONT_FAMILY, DEFAULT_OUTPUT_WIDTH, DEFAULT_TEXT_PADDING,
    DEFAULT_VERTICAL_PADDING, DEFAULT_WATERMARK_FONT_FAMILY, DEFAULT_WATERMARK_OFFSET,
    DEFAULT_WATERMARK_TEXT,
};

/// Layout constants for meme rendering.
///
/// Every field defaults to the canonical value, so an empty `meme:` section
/// (or none at all) renders exactly the canonical layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeStyle {
    /// Width of the rendered image in pixels
    #[serde(default = "default_output_width")]
    pub output_width: u32,

    /// Horizontal padding on each side of a caption
    #[serde(default = "default_text_padding")]
    pub text_padding: u32,

    /// Vertical offset of a caption from its edge
    #[serde(default = "default_vertical_padding")]
    pub vertical_padding: i32,

    /// Font face used for captions
    #[serde(default = "default_caption_font_family")]
    pub caption_font_family: String,

    /// Whether the watermark is added to captioned images
    #[serde(default = "default_true")]
    pub watermark_enabled: bool,

    /// Watermark text (embedded as-is, percent-encoded)
    #[serde(default = "default_watermark_text")]
    pub watermark_text: String,

    /// Font face used for the watermark (rendered bold)
    #[serde(default = "default_watermark_font_family")]
    pub watermark_font_family: String,

    /// Distance of the watermark from the bottom-right corner
    #[serde(default = "default_watermark_offset")]
    pub watermark_offset: i32,
}

impl Default for MemeStyle {
    fn default() -> Self {
        Self {
            output_width: default_output_width(),
            text_padding: default_text_padding(),
            vertical_padding: default_vertical_padding(),
            caption_font_family: default_caption_font_family(),
            watermark_enabled: true,
            watermark_text: default_watermark_text(),
            watermark_font_family: default_watermark_font_family(),
            watermark_offset: default_watermark_offset(),
        }
    }
}

impl MemeStyle {
    /// Width available to a caption once padding is removed.
    pub fn caption_width(&self) -> u32 {
        self.output_width.saturating_sub(self.text_padding.saturating_mul(2))
    }

    /// Fixed watermark font size, proportional to the output width.
    pub fn watermark_font_size(&self) -> u32 {
        (self.output_width / 24).max(1)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.output_width == 0 {
            return Err("meme.output_width must be greater than 0".to_string());
        }
        if self.text_padding.saturating_mul(2) >= self.output_width {
            return Err(format!(
                "meme.text_padding {} leaves no room for captions at width {}",
                self.text_padding, self.output_width
            ));
        }
        if self.caption_font_family.trim().is_empty() {
            return Err("meme.caption_font_family cannot be empty".to_string());
        }
        if self.watermark_enabled && self.watermark_text.is_empty() {
            return Err("meme.watermark_text cannot be empty when the watermark is enabled".to_string());
        }
        Ok(())
    }
}

fn default_output_width() -> u32 {
    DEFAULT_OUTPUT_WIDTH
}

fn default_text_padding() -> u32 {
    DEFAULT_TEXT_PADDING
}

fn default_vertical_padding() -> i32 {
    DEFAULT_VERTICAL_PADDING
}

fn default_caption_font_family() -> String {
    DEFAULT_CAPTION_FONT_FAMILY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_watermark_text() -> String {
    DEFAULT_WATERMARK_TEXT.to_string()
}

fn default_watermark_font_family() -> String {
    DEFAULT_WATERMARK_FONT_FAMILY.to_string()
}

fn default_watermark_offset() -> i32 {
    DEFAULT_WATERMARK_OFFSET
}
