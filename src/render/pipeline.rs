use rayon::prelude::*;

use crate::{
    codec::ImageHandle,
    config::ProgressBarConfig,
    foundation::error::BarResult,
    geometry::compute_geometry,
    render::backend::{BackendKind, BarPaint, RasterBackend, RenderSettings, create_backend},
};

/// Validate, compute geometry, rasterize and encode a single bar.
///
/// This is the primary one-shot API. Errors surface unchanged; nothing is retried.
#[tracing::instrument(level = "debug", skip_all, fields(backend = ?backend.kind()))]
pub fn render_bar(config: &ProgressBarConfig, backend: &dyn RasterBackend) -> BarResult<ImageHandle> {
    let geometry = compute_geometry(config)?;
    let paint = BarPaint::from_config(config);
    backend.render(&geometry, &paint)
}

/// Render independent bars in parallel.
///
/// Results keep the input order; a failing bar does not affect the others.
pub fn render_bars(
    configs: &[ProgressBarConfig],
    backend: &dyn RasterBackend,
) -> Vec<BarResult<ImageHandle>> {
    configs
        .par_iter()
        .map(|cfg| render_bar(cfg, backend))
        .collect()
}

/// Render with the backend and settings chosen by the environment.
pub fn render_bar_from_env(config: &ProgressBarConfig) -> BarResult<ImageHandle> {
    let kind = BackendKind::from_env()?;
    let backend = create_backend(kind, &RenderSettings::from_env());
    render_bar(config, backend.as_ref())
}
