use std::time::Duration;

/// Convenience result type used across foxbar.
pub type BarResult<T> = Result<T, BarError>;

/// Error taxonomy for progress-bar rendering.
///
/// Every variant is raised where it is detected and handed to the caller unchanged; the
/// engine keeps no state between calls, so nothing is retried or rolled back.
#[derive(thiserror::Error, Debug)]
pub enum BarError {
    /// Width, height, screen scale or corner radius is out of range.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// `progress_steps` must be a positive integer.
    #[error("invalid progress steps: {0} (must be > 0)")]
    InvalidSteps(i64),

    /// Progress value that cannot be turned into a fill length.
    #[error("invalid progress: {0}")]
    InvalidProgress(String),

    /// A color string that is not a recognized hex form.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The drawing surface could not be allocated or the backend failed to draw.
    #[error("rasterization failed: {0}")]
    RasterizationFailed(String),

    /// A message-based backend did not answer in time.
    #[error("backend timed out after {0:?}")]
    BackendTimeout(Duration),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BarError {
    /// Build a [`BarError::InvalidDimensions`] value.
    pub fn dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    /// Build a [`BarError::InvalidProgress`] value.
    pub fn progress(msg: impl Into<String>) -> Self {
        Self::InvalidProgress(msg.into())
    }

    /// Build a [`BarError::InvalidColor`] value.
    pub fn color(msg: impl Into<String>) -> Self {
        Self::InvalidColor(msg.into())
    }

    /// Build a [`BarError::RasterizationFailed`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::RasterizationFailed(msg.into())
    }

    /// Build a [`BarError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for BarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
