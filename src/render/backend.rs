use std::time::Duration;

use crate::{
    codec::ImageHandle,
    config::ProgressBarConfig,
    foundation::core::Color,
    foundation::error::{BarError, BarResult},
    geometry::BarGeometry,
};

/// Raw rasterizer output.
///
/// Both backends produce **premultiplied** RGBA8; the `premultiplied` flag keeps that explicit at
/// the codec boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RasterImage {
    /// RGBA8 channels of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Largest surface either backend will allocate (8192 x 8192 pixels).
pub const MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// Reject surfaces that are empty or larger than [`MAX_SURFACE_PIXELS`] before allocating.
pub fn check_surface(width: u32, height: u32) -> BarResult<()> {
    if width == 0 || height == 0 {
        return Err(BarError::raster(format!(
            "cannot allocate a {width}x{height} surface"
        )));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_SURFACE_PIXELS {
        return Err(BarError::raster(format!(
            "{width}x{height} surface has {pixels} pixels (limit {MAX_SURFACE_PIXELS})"
        )));
    }
    Ok(())
}

/// Paint parameters handed to a backend alongside the geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarPaint {
    /// Fill rectangle color.
    pub fill: Color,
    /// Track color.
    pub background: Color,
    /// Whether the track is painted at all.
    pub paint_background: bool,
}

impl BarPaint {
    /// Paint derived from a config; `transparent` suppresses the track paint.
    pub fn from_config(config: &ProgressBarConfig) -> Self {
        Self {
            fill: config.fill_color,
            background: config.background_color,
            paint_background: !config.transparent,
        }
    }
}

/// A rasterizer that turns bar geometry into an encoded image.
///
/// Implementations hold no per-render state, so one backend can serve concurrent renders.
pub trait RasterBackend: Send + Sync {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Draw the track, clip to its rounded silhouette, fill, and encode.
    fn render(&self, geometry: &BarGeometry, paint: &BarPaint) -> BarResult<ImageHandle>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// In-process drawing context powered by `vello_cpu`.
    Cpu,
    /// SVG document evaluated by `resvg` on a worker, answered with PNG bytes.
    Svg,
}

/// Environment variable that selects the backend (`cpu` or `svg`).
pub const BACKEND_ENV: &str = "FOXBAR_BACKEND";
/// Environment variable with the message backend timeout in milliseconds.
pub const BACKEND_TIMEOUT_ENV: &str = "FOXBAR_BACKEND_TIMEOUT_MS";

impl BackendKind {
    /// Parse a backend name as used by the environment and the CLI.
    pub fn parse(name: &str) -> BarResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "svg" => Ok(Self::Svg),
            other => Err(BarError::Other(anyhow::anyhow!(
                "unknown backend '{other}' (expected 'cpu' or 'svg')"
            ))),
        }
    }

    /// Backend chosen by the deployment environment, `Cpu` when unset.
    pub fn from_env() -> BarResult<Self> {
        match std::env::var(BACKEND_ENV) {
            Ok(v) if !v.trim().is_empty() => Self::parse(&v),
            _ => Ok(Self::Cpu),
        }
    }
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// How long a message-based backend may take before the render fails.
    pub timeout: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5_000),
        }
    }
}

impl RenderSettings {
    /// Defaults, with the timeout overridden by the environment when it parses.
    pub fn from_env() -> Self {
        let timeout = std::env::var(BACKEND_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map(Duration::from_millis);
        match timeout {
            Some(timeout) => Self { timeout },
            None => Self::default(),
        }
    }
}

/// Create a rasterization backend.
pub fn create_backend(kind: BackendKind, settings: &RenderSettings) -> Box<dyn RasterBackend> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuBackend::new()),
        BackendKind::Svg => Box::new(crate::render::svg::SvgBackend::new(settings.timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(BackendKind::parse("CPU").unwrap(), BackendKind::Cpu);
        assert_eq!(BackendKind::parse(" svg ").unwrap(), BackendKind::Svg);
        assert!(BackendKind::parse("gpu").is_err());
    }

    #[test]
    fn create_backend_reports_kind() {
        let settings = RenderSettings::default();
        assert_eq!(
            create_backend(BackendKind::Cpu, &settings).kind(),
            BackendKind::Cpu
        );
        assert_eq!(
            create_backend(BackendKind::Svg, &settings).kind(),
            BackendKind::Svg
        );
    }

    #[test]
    fn paint_follows_transparent_flag() {
        let mut cfg = ProgressBarConfig::default();
        assert!(!BarPaint::from_config(&cfg).paint_background);
        cfg.transparent = false;
        let paint = BarPaint::from_config(&cfg);
        assert!(paint.paint_background);
        assert_eq!(paint.background, cfg.background_color);
    }

    #[test]
    fn surface_budget_rejects_empty_and_huge_surfaces() {
        check_surface(8192, 8192).unwrap();
        check_surface(1, 8192 * 8192).unwrap();
        for (w, h) in [(0, 10), (10, 0), (8193, 8192), (65_535, 65_535), (u32::MAX, u32::MAX)] {
            assert!(
                matches!(check_surface(w, h), Err(BarError::RasterizationFailed(_))),
                "{w}x{h}"
            );
        }
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let img = RasterImage {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            premultiplied: true,
        };
        assert_eq!(img.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(0, 1), None);
    }
}
