use crate::config::{FillDirection, Orientation, ProgressBarConfig};
use crate::foundation::core::{Rect, RoundedRect};
use crate::foundation::error::{BarError, BarResult};

/// Device-pixel geometry derived from a [`ProgressBarConfig`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGeometry {
    /// Full track, always anchored at the origin.
    pub track: Rect,
    /// Fill rectangle, contained in `track`.
    pub fill: Rect,
    /// Scaled radius, clamped to half of the shorter track side.
    pub corner_radius: f64,
    /// Surface width (track width rounded up).
    pub pixel_width: u32,
    /// Surface height (track height rounded up).
    pub pixel_height: u32,
    /// Per-step pixel length after 3-decimal rounding.
    pub step_length: f64,
}

impl BarGeometry {
    /// Rounded silhouette of the track; the fill is clipped to it.
    pub fn silhouette(&self) -> RoundedRect {
        RoundedRect::from_rect(self.track, self.corner_radius)
    }

    pub fn fill_area(&self) -> f64 {
        self.fill.area()
    }

    pub fn fill_is_empty(&self) -> bool {
        self.fill.width() <= 0.0 || self.fill.height() <= 0.0
    }
}

/// Round half away from zero to 3 decimal places.
pub fn round_to_thousandths(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Map a config to its track and fill rectangles.
///
/// Percentages outside `[0, 100]` are clamped, and the fill length is capped at the axis size so
/// rounding of the step length cannot push the fill past the track.
#[tracing::instrument(level = "debug", skip(config), fields(
    orientation = ?config.orientation,
    direction = ?config.fill_direction,
    pct = config.progress_percentage,
))]
pub fn compute_geometry(config: &ProgressBarConfig) -> BarResult<BarGeometry> {
    config.validate()?;

    let scale = config.effective_scale();
    let axis_width = config.width * scale;
    let axis_height = config.height * scale;
    if axis_width.ceil() > f64::from(u32::MAX) || axis_height.ceil() > f64::from(u32::MAX) {
        return Err(BarError::dimensions(format!(
            "scaled size {axis_width}x{axis_height} does not fit a pixel surface"
        )));
    }
    let track = Rect::new(0.0, 0.0, axis_width, axis_height);

    let axis_size = match config.orientation {
        Orientation::Vertical => axis_height,
        Orientation::Horizontal => axis_width,
    };

    let pct = config.progress_percentage.clamp(0.0, 100.0);
    if pct != config.progress_percentage {
        tracing::debug!(
            requested = config.progress_percentage,
            clamped = pct,
            "progress percentage clamped"
        );
    }

    let step_length = round_to_thousandths(axis_size / config.progress_steps as f64);
    let fill_length = (step_length * pct).min(axis_size);

    let fill = match (config.orientation, config.fill_direction) {
        (Orientation::Vertical, FillDirection::FromStart) => {
            Rect::new(0.0, 0.0, axis_width, fill_length)
        }
        (Orientation::Vertical, FillDirection::FromEnd) => {
            let offset_y = axis_height - fill_length;
            Rect::new(0.0, offset_y, axis_width, axis_height)
        }
        (Orientation::Horizontal, FillDirection::FromStart) => {
            Rect::new(0.0, 0.0, fill_length, axis_height)
        }
        (Orientation::Horizontal, FillDirection::FromEnd) => {
            let offset_x = axis_width - fill_length;
            Rect::new(offset_x, 0.0, axis_width, axis_height)
        }
    };

    let corner_radius = (config.corner_radius * scale).min(axis_width.min(axis_height) / 2.0);

    Ok(BarGeometry {
        track,
        fill,
        corner_radius,
        pixel_width: axis_width.ceil() as u32,
        pixel_height: axis_height.ceil() as u32,
        step_length,
    })
}
