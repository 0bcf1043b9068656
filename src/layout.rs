//! Page geometry and content-stream number formatting

/// Fractional digits kept when writing coordinates into a content stream
pub const COORD_PRECISION: usize = 4;

/// Page dimensions in PDF user-space units (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Size of a `[llx lly urx ury]` box
    pub fn from_box(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self::new((urx - llx).abs(), (ury - lly).abs())
    }

    /// `0 0 w h re` operands covering the full page
    pub fn rect_operands(&self) -> String {
        format!("0 0 {} {}", format_number(self.width), format_number(self.height))
    }
}

/// Format a number for a content stream.
///
/// Rounds to [`COORD_PRECISION`] fractional digits, then drops trailing zeros
/// (and the decimal point if nothing is left after it).
///
/// # Example
///
/// ```
/// use pdf_invert::layout::format_number;
///
/// assert_eq!(format_number(612.00004), "612");
/// assert_eq!(format_number(595.3), "595.3");
/// ```
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.*}", COORD_PRECISION, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    // -0.00001 rounds to "-0"
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
