// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers keeps the defaults in one place.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default maximum webhook body size (1 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// Meme layout defaults
// =============================================================================

/// Output image width in pixels
pub const DEFAULT_OUTPUT_WIDTH: u32 = 500;

/// Horizontal caption padding in pixels (applied on both sides)
pub const DEFAULT_TEXT_PADDING: u32 = 10;

/// Vertical caption offset in pixels
pub const DEFAULT_VERTICAL_PADDING: i32 = 20;

/// Caption font face
pub const DEFAULT_CAPTION_FONT_FAMILY: &str = "Impact";

/// Watermark text
pub const DEFAULT_WATERMARK_TEXT: &str = "MEMEBOT";

/// Watermark font face
pub const DEFAULT_WATERMARK_FONT_FAMILY: &str = "Arial";

/// Watermark distance from the bottom-right corner in pixels
pub const DEFAULT_WATERMARK_OFFSET: i32 = 5;

// =============================================================================
// Messenger defaults
// =============================================================================

/// Graph API base URL for the Send API
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v2.6";

/// Outbound request timeout in seconds
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Cloudinary defaults
// =============================================================================

/// Delivery host for transformed images
pub const DEFAULT_CLOUDINARY_DELIVERY_HOST: &str = "res.cloudinary.com";

/// Upload/admin API base URL
pub const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Tag attached to images users send us
pub const DEFAULT_USER_UPLOAD_TAG: &str = "user-upload";

/// Folder prefix of the stock image library
pub const DEFAULT_STOCK_IMAGE_PREFIX: &str = "stock/";

/// Page size when listing stock images
pub const STOCK_IMAGE_LIST_LIMIT: u32 = 100;

/// Page size when pruning user uploads
pub const PRUNE_PAGE_SIZE: u32 = 50;

/// Uploads older than this many days are pruned
pub const DEFAULT_MAX_UPLOAD_AGE_DAYS: f64 = 3.0;

// =============================================================================
// Session store defaults
// =============================================================================

/// Key prefix for session entries
pub const DEFAULT_SESSION_KEY_PREFIX: &str = "memebot";

/// Redis operation timeout in milliseconds
pub const DEFAULT_REDIS_OPERATION_TIMEOUT_MS: u64 = 2000;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";
