//! Caption font sizing
//!
//! Longer captions get smaller text so they keep fitting the fixed-width
//! canvas; the cap keeps short captions from rendering oversized.

/// Smallest size ever returned
pub const MIN_FONT_SIZE: u32 = 1;

/// Largest font allowed for a caption box of `max_width` pixels
pub fn font_cap(max_width: u32) -> u32 {
    max_width / 12
}

/// Font size for a caption of `text_len` characters in a box `max_width` wide.
///
/// `round(W * 0.25 - 20 * ln(L))`, clamped to [`font_cap`] from above and
/// [`MIN_FONT_SIZE`] from below.
///
/// # Panics
///
/// Panics if `text_len` is zero. Empty captions never reach this function;
/// the pipeline skips them before sizing.
pub fn font_size(text_len: usize, max_width: u32) -> u32 {
    assert!(text_len > 0, "font_size called with an empty caption");

    let candidate = round_half_up(max_width as f64 * 0.25 - 20.0 * (text_len as f64).ln());
    let cap = font_cap(max_width) as i64;

    candidate.min(cap).max(MIN_FONT_SIZE as i64) as u32
}

/// Border width scales with the text it outlines
pub fn border_width(font_size: u32) -> u32 {
    (font_size + 7) / 8
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
