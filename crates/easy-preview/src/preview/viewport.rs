// Viewport - Preview dimensions and their floors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum preview width in CSS pixels.
pub const MIN_WIDTH: u32 = 200;

/// Minimum preview height in CSS pixels.
pub const MIN_HEIGHT: u32 = 300;

/// Width used when a dimension input is not a number.
pub const FALLBACK_WIDTH: u32 = 375;

/// Height used when a dimension input is not a number.
pub const FALLBACK_HEIGHT: u32 = 667;

/// Preview dimensions in integral CSS pixels.
///
/// Every mutation site clamps to [`MIN_WIDTH`] x [`MIN_HEIGHT`], except
/// [`Viewport::rotated`], which swaps verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Page width in pixels
    pub width: u32,
    /// Page height in pixels
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport clamped to the floors.
    pub fn clamped(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
        }
    }

    /// Swaps width and height without re-clamping.
    ///
    /// A viewport narrower than [`MIN_HEIGHT`] produces a height below the
    /// floor after the swap (250x400 becomes 400x250).
    pub fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Parses the width/height input fields.
    ///
    /// Non-numeric (or zero) text falls back to 375x667 per axis; the result
    /// is clamped, so negative numbers land on the floor.
    pub fn from_inputs(width: &str, height: &str) -> Self {
        let width = parse_dimension(width).unwrap_or(i64::from(FALLBACK_WIDTH));
        let height = parse_dimension(height).unwrap_or(i64::from(FALLBACK_HEIGHT));
        Self {
            width: clamp_axis(width, MIN_WIDTH),
            height: clamp_axis(height, MIN_HEIGHT),
        }
    }

    /// Whether both axes satisfy their floors.
    pub fn is_within_floors(&self) -> bool {
        self.width >= MIN_WIDTH && self.height >= MIN_HEIGHT
    }

    /// Text for the dimension display, e.g. `320 × 568`.
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.width, self.height)
    }
}

/// Parses an integer dimension the way a lenient number field does.
///
/// Leading whitespace and sign are accepted, parsing stops at the first
/// non-digit (`"412px"` is 412). Empty, non-numeric and zero input yield
/// `None`, so callers substitute their fallback.
pub fn parse_dimension(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    (value != 0).then_some(sign * value)
}

/// Clamps a signed axis value into `min..=u32::MAX`.
pub(crate) fn clamp_axis(value: i64, min: u32) -> u32 {
    u32::try_from(value.max(i64::from(min))).unwrap_or(u32::MAX)
}
