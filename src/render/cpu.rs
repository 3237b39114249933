use kurbo::Shape as _;

use crate::{
    codec::{self, ImageHandle},
    foundation::core::{Color, Rect},
    foundation::error::{BarError, BarResult},
    geometry::BarGeometry,
    render::backend::{BackendKind, BarPaint, RasterBackend, RasterImage, check_surface},
};

const PATH_TOLERANCE: f64 = 0.1;

/// In-process backend powered by `vello_cpu`.
///
/// The track silhouette is drawn once as a path and then pushed as a clip layer, so the square
/// fill rect picks up the track's rounded corners at any fill length.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }

    /// Draw into a premultiplied RGBA8 buffer without encoding.
    pub fn rasterize(&self, geometry: &BarGeometry, paint: &BarPaint) -> BarResult<RasterImage> {
        check_surface(geometry.pixel_width, geometry.pixel_height)?;
        let width: u16 = geometry
            .pixel_width
            .try_into()
            .map_err(|_| BarError::raster("surface width exceeds u16"))?;
        let height: u16 = geometry
            .pixel_height
            .try_into()
            .map_err(|_| BarError::raster("surface height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let silhouette = bezpath_to_cpu(&geometry.silhouette().to_path(PATH_TOLERANCE));

        if paint.paint_background && !paint.background.is_invisible() {
            ctx.set_paint(color_to_cpu(paint.background));
            ctx.fill_path(&silhouette);
        }

        if !geometry.fill_is_empty() && !paint.fill.is_invisible() {
            ctx.push_clip_layer(&silhouette);
            ctx.set_paint(color_to_cpu(paint.fill));
            ctx.fill_rect(&rect_to_cpu(geometry.fill));
            ctx.pop_layer();
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RasterImage {
            width: geometry.pixel_width,
            height: geometry.pixel_height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl RasterBackend for CpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    #[tracing::instrument(level = "debug", skip_all, fields(
        w = geometry.pixel_width,
        h = geometry.pixel_height,
    ))]
    fn render(&self, geometry: &BarGeometry, paint: &BarPaint) -> BarResult<ImageHandle> {
        let raster = self.rasterize(geometry, paint)?;
        codec::encode(&raster)
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
