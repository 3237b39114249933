//! foxbar renders the rounded progress bars shown on home-screen dashboard widgets.
//!
//! A render is a one-shot pure transform:
//!
//! 1. **Configure**: build a [`ProgressBarConfig`] (defaults match the widget options).
//! 2. **Geometry**: [`compute_geometry`] maps it to a track rect and a fill rect in device pixels.
//! 3. **Rasterize**: a [`RasterBackend`] paints the track, clips to its rounded silhouette and
//!    fills the square fill rect inside the clip.
//! 4. **Encode**: the pixels come back as an [`ImageHandle`] for the layout layer.
//!
//! Two interchangeable backends exist: [`CpuBackend`] draws in-process with `vello_cpu`;
//! [`SvgBackend`] serializes the bar as an SVG document, has a worker evaluate it with `resvg`
//! and waits for PNG bytes with a timeout. [`BackendKind::from_env`] picks one per deployment.
//!
//! Identical configs produce byte-identical images, and no state is shared between renders, so
//! [`render_bars`] runs them in parallel.
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
mod foundation;
pub mod geometry;
pub mod presets;
mod render;

pub use codec::{ImageHandle, decode, encode};
pub use config::{FillDirection, Orientation, ProgressBarBuilder, ProgressBarConfig};
pub use foundation::core::{Color, Point, Rect, RoundedRect};
pub use foundation::error::{BarError, BarResult};
pub use geometry::{BarGeometry, compute_geometry, round_to_thousandths};
pub use render::backend::{
    BACKEND_ENV, BACKEND_TIMEOUT_ENV, BackendKind, BarPaint, MAX_SURFACE_PIXELS, RasterBackend,
    RasterImage, RenderSettings, check_surface, create_backend,
};
pub use render::cpu::CpuBackend;
pub use render::pipeline::{render_bar, render_bar_from_env, render_bars};
pub use render::svg::{SvgBackend, bar_svg_document, rasterize_svg_document};
