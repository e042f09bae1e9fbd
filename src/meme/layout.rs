//! Pipeline assembly
//!
//! Order is fixed: base resize, top caption, bottom caption, watermark.
//! Later steps render on top of earlier ones, so the watermark always comes
//! last and is only added when at least one caption is present.

use super::config::MemeStyle;
use super::font::{border_width, font_size};
use super::params::{
    Border, CaptionPosition, CropMode, FontWeight, Gravity, ImageTransform, MemeRequest,
    TextAlign, TextOverlay,
};

const CAPTION_COLOR: &str = "#ffffff";
const CAPTION_BORDER_COLOR: &str = "black";
const WATERMARK_BORDER_WIDTH: u32 = 1;

/// Upper-case and percent-encode caption text for embedding in a transform
pub fn encode_caption(text: &str) -> String {
    urlencoding::encode(&text.to_uppercase()).into_owned()
}

/// Overlay step for a single caption.
///
/// `position` is looked up leniently: anything other than `top` or `bottom`
/// is anchored like `bottom`. `text` must be non-empty.
pub fn caption_transform(text: &str, position: &str, style: &MemeStyle) -> ImageTransform {
    let gravity = CaptionPosition::resolve(position).gravity();
    let text_width = style.caption_width();
    let size = font_size(text.chars().count(), text_width);

    ImageTransform {
        width: Some(text_width),
        crop: Some(CropMode::Fit),
        gravity: Some(gravity),
        border: Some(Border::solid(border_width(size), CAPTION_BORDER_COLOR)),
        color: Some(CAPTION_COLOR.to_string()),
        overlay: Some(TextOverlay {
            font_family: style.caption_font_family.clone(),
            font_size: size,
            font_weight: FontWeight::Normal,
            text_align: Some(TextAlign::Center),
            stroke: true,
            text: encode_caption(text),
        }),
        x: None,
        y: Some(style.vertical_padding),
    }
}

/// Small branding overlay anchored bottom-right
pub fn watermark_transform(style: &MemeStyle) -> ImageTransform {
    ImageTransform {
        width: None,
        crop: None,
        gravity: Some(Gravity::SouthEast),
        border: Some(Border::solid(WATERMARK_BORDER_WIDTH, CAPTION_BORDER_COLOR)),
        color: Some(CAPTION_COLOR.to_string()),
        overlay: Some(TextOverlay {
            font_family: style.watermark_font_family.clone(),
            font_size: style.watermark_font_size(),
            font_weight: FontWeight::Bold,
            text_align: None,
            stroke: false,
            text: urlencoding::encode(&style.watermark_text).into_owned(),
        }),
        x: Some(style.watermark_offset),
        y: Some(style.watermark_offset),
    }
}

/// Full ordered pipeline for a request
pub fn build_pipeline(request: &MemeRequest<'_>, style: &MemeStyle) -> Vec<ImageTransform> {
    let mut pipeline = vec![ImageTransform::resize(style.output_width)];
    let mut captioned = false;

    for position in CaptionPosition::ALL {
        if let Some(text) = request.caption(position) {
            pipeline.push(caption_transform(text, position.as_str(), style));
            captioned = true;
        }
    }

    if captioned && style.watermark_enabled {
        pipeline.push(watermark_transform(style));
    }

    pipeline
}
