//! Mapping clicks on a displayed floor plan image to normalized marker positions.

use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlacementError {
    #[error("Click position is not a finite number")]
    InvalidClick,

    #[error("Displayed image size must be positive, got {width}x{height}")]
    InvalidDisplaySize { width: f64, height: f64 },
}

/// A position on a floor plan with both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Builds a point, clamping each axis into `[0, 1]`. NaN maps to 0.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// CSS `left` value for a marker, e.g. `"37.50%"`.
    pub fn left_percent(&self) -> String {
        format!("{:.2}%", self.x * 100.0)
    }

    /// CSS `top` value for a marker.
    pub fn top_percent(&self) -> String {
        format!("{:.2}%", self.y * 100.0)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Normalizes a click at (`click_x`, `click_y`) on an image displayed at
/// `display_width` x `display_height` pixels.
///
/// Coordinates are relative to the image's top-left corner. The result only
/// depends on the ratios, so the same spot yields the same point whatever size
/// the browser renders the image at.
pub fn normalize_click(
    click_x: f64,
    click_y: f64,
    display_width: f64,
    display_height: f64,
) -> Result<NormalizedPoint, PlacementError> {
    if !click_x.is_finite() || !click_y.is_finite() {
        return Err(PlacementError::InvalidClick);
    }
    if !(display_width.is_finite() && display_width > 0.0)
        || !(display_height.is_finite() && display_height > 0.0)
    {
        return Err(PlacementError::InvalidDisplaySize {
            width: display_width,
            height: display_height,
        });
    }

    Ok(NormalizedPoint::clamped(
        click_x / display_width,
        click_y / display_height,
    ))
}
