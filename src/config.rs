use crate::foundation::core::Color;
use crate::foundation::error::{BarError, BarResult};

/// Axis along which the fill grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Fill grows along the x axis.
    #[default]
    Horizontal,
    /// Fill grows along the y axis.
    Vertical,
}

/// Edge of the variable axis the fill is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillDirection {
    /// Anchored to the leading edge (left, or top for vertical bars).
    #[default]
    FromStart,
    /// Anchored to the trailing edge (right, or bottom for vertical bars).
    FromEnd,
}

/// Input for one progress-bar render.
///
/// Field defaults mirror the widget options; JSON keys are camelCase so configs written for the
/// widgets deserialize as-is. Construct through [`ProgressBarBuilder`] (or deserialize and call
/// [`ProgressBarConfig::validate`]) to get a config that the engine accepts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressBarConfig {
    /// Unscaled width in pixels.
    pub width: f64,
    /// Unscaled height in pixels.
    pub height: f64,
    /// Device scale multiplier.
    pub screen_scale: f64,
    /// Whether `screen_scale` is applied to width, height and corner radius.
    pub respect_screen_scale: bool,
    /// Paint for the fill rectangle.
    pub fill_color: Color,
    /// Paint for the track.
    pub background_color: Color,
    /// Unscaled corner radius of the track silhouette.
    pub corner_radius: f64,
    /// Fill amount, nominally `0..=100`.
    #[serde(deserialize_with = "de_percentage")]
    pub progress_percentage: f64,
    /// Quantization resolution for the per-step pixel length.
    #[serde(deserialize_with = "de_steps")]
    pub progress_steps: i64,
    /// When set, the track background is not painted and the canvas stays cleared.
    pub transparent: bool,
    /// Axis of fill growth.
    pub orientation: Orientation,
    /// Anchoring edge of the fill.
    pub fill_direction: FillDirection,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 20.0,
            screen_scale: 1.0,
            respect_screen_scale: true,
            fill_color: Color::rgba(0x78, 0x14, 0xcf, 0xff),
            background_color: Color::rgba(0x00, 0xff, 0xff, 0xff),
            corner_radius: 10.0,
            progress_percentage: 0.0,
            progress_steps: 100,
            transparent: true,
            orientation: Orientation::Horizontal,
            fill_direction: FillDirection::FromStart,
        }
    }
}

impl ProgressBarConfig {
    /// Start a builder from the documented defaults.
    pub fn builder() -> ProgressBarBuilder {
        ProgressBarBuilder::default()
    }

    /// Parse a config from JSON, filling missing keys with defaults, and validate it.
    pub fn from_json_str(s: &str) -> BarResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field the geometry calculator depends on.
    pub fn validate(&self) -> BarResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(BarError::dimensions(format!(
                "width must be finite and > 0 (got {})",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(BarError::dimensions(format!(
                "height must be finite and > 0 (got {})",
                self.height
            )));
        }
        if !(self.screen_scale.is_finite() && self.screen_scale > 0.0) {
            return Err(BarError::dimensions(format!(
                "screen scale must be finite and > 0 (got {})",
                self.screen_scale
            )));
        }
        if !(self.corner_radius.is_finite() && self.corner_radius >= 0.0) {
            return Err(BarError::dimensions(format!(
                "corner radius must be finite and >= 0 (got {})",
                self.corner_radius
            )));
        }
        if self.progress_steps <= 0 {
            return Err(BarError::InvalidSteps(self.progress_steps));
        }
        if !self.progress_percentage.is_finite() {
            return Err(BarError::progress(format!(
                "percentage must be finite (got {})",
                self.progress_percentage
            )));
        }
        Ok(())
    }

    /// Multiplier applied to width, height and radius.
    pub fn effective_scale(&self) -> f64 {
        if self.respect_screen_scale {
            self.screen_scale
        } else {
            1.0
        }
    }
}

/// Widget callers hand over either a number or the string produced by `toPrecision`.
fn de_percentage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Str(String),
    }

    match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::Num(v) => Ok(v),
        Repr::Str(s) => s.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("progressPercentage \"{s}\" is not a number"))
        }),
    }
}

/// Signed so that zero and negative counts reach [`ProgressBarConfig::validate`]; integral
/// floats such as `100.0` are accepted.
fn de_steps<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Float(f64),
    }

    match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::Int(v) => Ok(v),
        Repr::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        Repr::Float(v) => Err(serde::de::Error::custom(format!(
            "progressSteps {v} is not a whole number"
        ))),
    }
}

/// Fluent, validating constructor for [`ProgressBarConfig`].
#[derive(Clone, Debug, Default)]
pub struct ProgressBarBuilder {
    cfg: ProgressBarConfig,
}

impl ProgressBarBuilder {
    /// Unscaled bar size.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.cfg.width = width;
        self.cfg.height = height;
        self
    }

    /// Device scale; `None` renders at the unscaled size.
    pub fn screen_scale(mut self, scale: Option<f64>) -> Self {
        match scale {
            Some(s) => {
                self.cfg.screen_scale = s;
                self.cfg.respect_screen_scale = true;
            }
            None => self.cfg.respect_screen_scale = false,
        }
        self
    }

    pub fn fill_color(mut self, color: Color) -> Self {
        self.cfg.fill_color = color;
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.cfg.background_color = color;
        self
    }

    /// Parse and set both paints from hex strings.
    pub fn colors(mut self, fill: &str, background: &str) -> BarResult<Self> {
        self.cfg.fill_color = Color::from_hex(fill)?;
        self.cfg.background_color = Color::from_hex(background)?;
        Ok(self)
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.cfg.corner_radius = radius;
        self
    }

    pub fn percentage(mut self, pct: f64) -> Self {
        self.cfg.progress_percentage = pct;
        self
    }

    pub fn steps(mut self, steps: i64) -> Self {
        self.cfg.progress_steps = steps;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.cfg.transparent = transparent;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.cfg.orientation = orientation;
        self
    }

    pub fn fill_direction(mut self, direction: FillDirection) -> Self {
        self.cfg.fill_direction = direction;
        self
    }

    pub fn build(self) -> BarResult<ProgressBarConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}
