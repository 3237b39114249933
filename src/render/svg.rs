use std::fmt::Write as _;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use crate::{
    codec::{self, ImageHandle},
    foundation::core::Color,
    foundation::error::{BarError, BarResult},
    geometry::BarGeometry,
    render::backend::{BackendKind, BarPaint, RasterBackend, RasterImage, check_surface},
};

/// Message-based backend.
///
/// Each render serializes the bar into a standalone SVG document and ships it to a worker thread,
/// which evaluates it with `resvg` and answers with PNG bytes. The caller blocks until the reply
/// arrives or the timeout expires; a late worker is detached and its reply dropped.
#[derive(Clone, Copy, Debug)]
pub struct SvgBackend {
    timeout: Duration,
}

impl SvgBackend {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl RasterBackend for SvgBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Svg
    }

    #[tracing::instrument(level = "debug", skip_all, fields(
        w = geometry.pixel_width,
        h = geometry.pixel_height,
        timeout_ms = self.timeout.as_millis() as u64,
    ))]
    fn render(&self, geometry: &BarGeometry, paint: &BarPaint) -> BarResult<ImageHandle> {
        let (width, height) = (geometry.pixel_width, geometry.pixel_height);
        check_surface(width, height)?;
        let document = bar_svg_document(geometry, paint);

        let (tx, rx) = mpsc::sync_channel::<Result<Vec<u8>, String>>(1);
        std::thread::Builder::new()
            .name("foxbar-svg".to_owned())
            .spawn(move || {
                let reply = evaluate_document(&document, width, height).map_err(|e| e.to_string());
                // The caller may have given up already.
                let _ = tx.send(reply);
            })
            .map_err(|e| BarError::raster(format!("failed to spawn svg worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(png)) => codec::decode(&png),
            Ok(Err(msg)) => Err(BarError::raster(msg)),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout = ?self.timeout, "svg backend did not answer in time");
                Err(BarError::BackendTimeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(BarError::raster("svg worker exited without replying"))
            }
        }
    }
}

/// Worker side of the exchange: document in, PNG bytes out.
fn evaluate_document(document: &str, width: u32, height: u32) -> BarResult<Vec<u8>> {
    let raster = rasterize_svg_document(document, width, height)?;
    codec::encode(&raster)?.to_png()
}

/// Serialize bar geometry and paint into an SVG document in device pixels.
///
/// The fill is a plain rect clipped by a `clipPath` holding the track's rounded rect.
pub fn bar_svg_document(geometry: &BarGeometry, paint: &BarPaint) -> String {
    let t = geometry.track;
    let f = geometry.fill;
    let r = num(geometry.corner_radius);

    let mut doc = String::with_capacity(512);
    let _ = write!(
        doc,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = geometry.pixel_width,
        h = geometry.pixel_height,
    );
    let _ = write!(
        doc,
        r#"<defs><clipPath id="track"><rect x="0" y="0" width="{}" height="{}" rx="{r}" ry="{r}"/></clipPath></defs>"#,
        num(t.width()),
        num(t.height()),
    );
    if paint.paint_background && !paint.background.is_invisible() {
        let _ = write!(
            doc,
            r#"<rect x="0" y="0" width="{}" height="{}" rx="{r}" ry="{r}" {}/>"#,
            num(t.width()),
            num(t.height()),
            fill_attrs(paint.background),
        );
    }
    if !geometry.fill_is_empty() && !paint.fill.is_invisible() {
        let _ = write!(
            doc,
            r#"<rect x="{}" y="{}" width="{}" height="{}" {} clip-path="url(#track)"/>"#,
            num(f.x0),
            num(f.y0),
            num(f.width()),
            num(f.height()),
            fill_attrs(paint.fill),
        );
    }
    doc.push_str("</svg>");
    doc
}

/// Parse and render an SVG document into a premultiplied RGBA8 buffer.
pub fn rasterize_svg_document(document: &str, width: u32, height: u32) -> BarResult<RasterImage> {
    check_surface(width, height)?;
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(document.as_bytes(), &opts)
        .map_err(|e| BarError::raster(format!("parse bar svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| BarError::raster(format!("failed to allocate {width}x{height} pixmap")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(RasterImage {
        width,
        height,
        data: pixmap.data().to_vec(),
        premultiplied: true,
    })
}

fn fill_attrs(c: Color) -> String {
    format!(r#"fill="{}" fill-opacity="{}""#, c.rgb_hex(), num(c.opacity()))
}

fn num(v: f64) -> String {
    format!("{v:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressBarConfig;
    use crate::geometry::compute_geometry;

    fn geometry(pct: f64) -> BarGeometry {
        let cfg = ProgressBarConfig::builder()
            .screen_scale(None)
            .percentage(pct)
            .build()
            .unwrap();
        compute_geometry(&cfg).unwrap()
    }

    #[test]
    fn document_clips_fill_to_track() {
        let paint = BarPaint {
            fill: Color::rgba(0x78, 0x14, 0xcf, 0xff),
            background: Color::rgba(0, 0xff, 0xff, 0x80),
            paint_background: true,
        };
        let doc = bar_svg_document(&geometry(50.0), &paint);
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"<clipPath id="track"><rect x="0" y="0" width="100.000" height="20.000" rx="10.000" ry="10.000"/>"#));
        assert!(doc.contains(r##"fill="#00ffff" fill-opacity="0.502""##));
        assert!(doc.contains(r##"<rect x="0.000" y="0.000" width="50.000" height="20.000" fill="#7814cf" fill-opacity="1.000" clip-path="url(#track)"/>"##));
        assert!(doc.ends_with("</svg>"));
    }

    #[test]
    fn document_omits_empty_fill_and_suppressed_track() {
        let paint = BarPaint {
            fill: Color::WHITE,
            background: Color::WHITE,
            paint_background: false,
        };
        let doc = bar_svg_document(&geometry(0.0), &paint);
        assert!(!doc.contains("clip-path=\"url(#track)\""));
        assert_eq!(doc.matches("<rect").count(), 1);
    }

    #[test]
    fn rasterizes_document_to_requested_size() {
        let paint = BarPaint {
            fill: Color::WHITE,
            background: Color::TRANSPARENT,
            paint_background: false,
        };
        let g = geometry(50.0);
        let img =
            rasterize_svg_document(&bar_svg_document(&g, &paint), g.pixel_width, g.pixel_height)
                .unwrap();
        assert_eq!((img.width, img.height), (100, 20));
        assert_eq!(img.pixel(25, 10), Some([255, 255, 255, 255]));
        assert_eq!(img.pixel(75, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn oversized_surface_is_rejected_before_parsing() {
        let err = rasterize_svg_document("<svg", 65_535, 65_535).unwrap_err();
        assert!(err.to_string().contains("limit"), "{err}");

        let cfg = ProgressBarConfig::builder()
            .size(60_000.0, 60_000.0)
            .screen_scale(None)
            .build()
            .unwrap();
        let g = compute_geometry(&cfg).unwrap();
        let err = SvgBackend::new(Duration::from_secs(1))
            .render(&g, &BarPaint::from_config(&cfg))
            .unwrap_err();
        assert!(matches!(err, BarError::RasterizationFailed(_)));
    }

    #[test]
    fn malformed_document_is_a_rasterization_failure() {
        let err = rasterize_svg_document("<svg", 4, 4).unwrap_err();
        assert!(matches!(err, BarError::RasterizationFailed(_)));
    }
}
