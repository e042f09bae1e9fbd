//! Image transformation step types
//!
//! A pipeline is an ordered `Vec<ImageTransform>`; each step is composited on
//! top of the previous ones by the rendering service. Attribute names and
//! units follow what the URL builder expects: pixels for widths, offsets and
//! font sizes, compass strings for gravity, hex or named strings for colors.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where a caption sits on the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    Bottom,
}

/// Position used when a caller asks for a position nobody recognizes
pub const DEFAULT_POSITION: CaptionPosition = CaptionPosition::Bottom;

/// Fixed position → anchor table
const POSITION_TO_GRAVITY: [(CaptionPosition, Gravity); 2] = [
    (CaptionPosition::Top, Gravity::North),
    (CaptionPosition::Bottom, Gravity::South),
];

impl CaptionPosition {
    pub const ALL: [CaptionPosition; 2] = [CaptionPosition::Top, CaptionPosition::Bottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Strict lookup: `None` for anything other than `top`/`bottom`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == key)
    }

    /// Lenient lookup: unknown keys fall back to [`DEFAULT_POSITION`]
    pub fn resolve(key: &str) -> Self {
        Self::from_key(key).unwrap_or(DEFAULT_POSITION)
    }

    /// Rendering anchor for this position
    pub fn gravity(&self) -> Gravity {
        POSITION_TO_GRAVITY
            .iter()
            .find(|(position, _)| position == self)
            .map(|(_, gravity)| *gravity)
            .unwrap_or(Gravity::South)
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compass anchor for overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    #[default]
    Center,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Gravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::NorthEast => "north_east",
            Self::NorthWest => "north_west",
            Self::SouthEast => "south_east",
            Self::SouthWest => "south_west",
        }
    }
}

impl FromStr for Gravity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "center" => Ok(Gravity::Center),
            "north" => Ok(Gravity::North),
            "south" => Ok(Gravity::South),
            "east" => Ok(Gravity::East),
            "west" => Ok(Gravity::West),
            "north_east" => Ok(Gravity::NorthEast),
            "north_west" => Ok(Gravity::NorthWest),
            "south_east" => Ok(Gravity::SouthEast),
            "south_west" => Ok(Gravity::SouthWest),
            _ => Err(format!("unknown gravity: {}", s)),
        }
    }
}

/// How an overlay is fitted into its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    /// Scale to fit within the box, preserving aspect ratio
    Fit,
    /// Scale to the exact box, ignoring aspect ratio
    Scale,
    /// Like `Fit`, but never upscale
    Limit,
}

impl CropMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Scale => "scale",
            Self::Limit => "limit",
        }
    }
}

/// Solid border drawn around an overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Border {
    pub width: u32,
    pub color: String,
}

impl Border {
    pub fn solid(width: u32, color: impl Into<String>) -> Self {
        Self {
            width,
            color: color.into(),
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px_solid_{}", self.width, self.color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Text layer composited onto the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextOverlay {
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: FontWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    pub stroke: bool,
    /// Already percent-encoded
    pub text: String,
}

/// One step of a transformation pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageTransform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Gravity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<TextOverlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl ImageTransform {
    /// A step that only resizes to the given width
    pub fn resize(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }
}

/// Input to the engine: a base image plus optional captions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemeRequest<'a> {
    pub base_image_id: &'a str,
    pub top_text: Option<&'a str>,
    pub bottom_text: Option<&'a str>,
}

impl<'a> MemeRequest<'a> {
    pub fn new(base_image_id: &'a str) -> Self {
        Self {
            base_image_id,
            top_text: None,
            bottom_text: None,
        }
    }

    pub fn with_top(mut self, text: Option<&'a str>) -> Self {
        self.top_text = text;
        self
    }

    pub fn with_bottom(mut self, text: Option<&'a str>) -> Self {
        self.bottom_text = text;
        self
    }

    /// Caption for a position, with zero-length text treated as absent
    pub fn caption(&self, position: CaptionPosition) -> Option<&'a str> {
        let text = match position {
            CaptionPosition::Top => self.top_text,
            CaptionPosition::Bottom => self.bottom_text,
        };
        text.filter(|t| !t.is_empty())
    }
}
