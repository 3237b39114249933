use std::time::Duration;

use foxbar::{
    BackendKind, BarError, BarGeometry, BarPaint, Color, CpuBackend, FillDirection, ImageHandle,
    Orientation, ProgressBarConfig, RasterBackend, RenderSettings, SvgBackend, compute_geometry,
    create_backend, render_bar, render_bars,
};

fn svg_backend() -> SvgBackend {
    SvgBackend::new(Duration::from_secs(30))
}

fn assert_px_near(img: &ImageHandle, x: u32, y: u32, want: [u8; 4]) {
    let got = img.pixel(x, y).unwrap();
    for (g, w) in got.iter().zip(want) {
        assert!(g.abs_diff(w) <= 1, "pixel ({x},{y}) = {got:?}, want {want:?}");
    }
}

/// Signed distance from `(px, py)` to the rounded silhouette; negative inside.
fn silhouette_distance(g: &BarGeometry, px: f64, py: f64) -> f64 {
    let hw = g.track.width() / 2.0;
    let hh = g.track.height() / 2.0;
    let r = g.corner_radius;
    let qx = (px - hw).abs() - (hw - r);
    let qy = (py - hh).abs() - (hh - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

#[test]
fn svg_backend_round_trips_through_png() {
    let cfg = ProgressBarConfig::builder()
        .screen_scale(None)
        .transparent(false)
        .percentage(50.0)
        .build()
        .unwrap();
    let img = render_bar(&cfg, &svg_backend()).unwrap();

    assert_eq!((img.width(), img.height()), (100, 20));
    assert_px_near(&img, 25, 10, [0x78, 0x14, 0xcf, 0xff]);
    assert_px_near(&img, 75, 10, [0x00, 0xff, 0xff, 0xff]);
    assert_eq!(img.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn svg_and_cpu_agree_away_from_edges() {
    let cfg = ProgressBarConfig::builder()
        .size(40.0, 120.0)
        .screen_scale(Some(2.0))
        .orientation(Orientation::Vertical)
        .fill_direction(FillDirection::FromEnd)
        .colors("#fff", "#0000")
        .unwrap()
        .transparent(false)
        .percentage(25.0)
        .build()
        .unwrap();

    let cpu = render_bar(&cfg, &CpuBackend::new()).unwrap();
    let svg = render_bar(&cfg, &svg_backend()).unwrap();
    assert_eq!((cpu.width(), cpu.height()), (svg.width(), svg.height()));

    // Fill occupies y in [180, 240) on an 80x240 surface.
    for (x, y) in [(40, 60), (40, 120), (40, 200), (40, 220), (10, 190)] {
        assert_eq!(cpu.pixel(x, y), svg.pixel(x, y), "({x},{y})");
    }
    assert_px_near(&svg, 40, 200, [255, 255, 255, 255]);
    assert_eq!(svg.pixel(40, 60), Some([0, 0, 0, 0]));
}

#[test]
fn svg_fill_never_leaves_the_rounded_silhouette() {
    let backend = svg_backend();
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for direction in [FillDirection::FromStart, FillDirection::FromEnd] {
            for pct in [3.0, 50.0, 100.0] {
                let cfg = ProgressBarConfig::builder()
                    .size(60.0, 24.0)
                    .screen_scale(Some(2.0))
                    .corner_radius(9.0)
                    .orientation(orientation)
                    .fill_direction(direction)
                    .fill_color(Color::WHITE)
                    .percentage(pct)
                    .build()
                    .unwrap();
                let g = compute_geometry(&cfg).unwrap();
                let img = backend.render(&g, &BarPaint::from_config(&cfg)).unwrap();
                assert_eq!((img.width(), img.height()), (g.pixel_width, g.pixel_height));

                for y in 0..img.height() {
                    for x in 0..img.width() {
                        let a = img.pixel(x, y).unwrap()[3];
                        if a == 0 {
                            continue;
                        }
                        let d = silhouette_distance(&g, f64::from(x) + 0.5, f64::from(y) + 0.5);
                        assert!(
                            d <= 1.0,
                            "{orientation:?}/{direction:?}/{pct}: painted ({x},{y}) at distance {d}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn svg_render_is_deterministic() {
    let cfg = ProgressBarConfig::builder()
        .size(90.0, 14.0)
        .screen_scale(Some(3.0))
        .fill_color(Color::rgba(10, 200, 30, 200))
        .transparent(false)
        .percentage(71.0)
        .build()
        .unwrap();
    let backend = svg_backend();
    let a = render_bar(&cfg, &backend).unwrap();
    let b = render_bar(&cfg, &backend).unwrap();
    assert_eq!(a, b);
}

#[test]
fn slow_reply_surfaces_backend_timeout() {
    let cfg = ProgressBarConfig::builder()
        .size(3000.0, 3000.0)
        .screen_scale(None)
        .transparent(false)
        .percentage(90.0)
        .build()
        .unwrap();
    let backend = SvgBackend::new(Duration::from_nanos(1));
    match render_bar(&cfg, &backend) {
        Err(BarError::BackendTimeout(t)) => assert_eq!(t, Duration::from_nanos(1)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn svg_backend_serves_parallel_batches() {
    let configs: Vec<ProgressBarConfig> = [0.0, 12.5, 50.0, 87.5, 100.0]
        .into_iter()
        .map(|pct| {
            ProgressBarConfig::builder()
                .screen_scale(Some(2.0))
                .percentage(pct)
                .build()
                .unwrap()
        })
        .collect();

    let backend = create_backend(BackendKind::Svg, &RenderSettings::default());
    assert_eq!(backend.kind(), BackendKind::Svg);
    let results = render_bars(&configs, backend.as_ref());
    for (cfg, result) in configs.iter().zip(results) {
        let img = result.unwrap();
        assert_eq!(img, render_bar(cfg, backend.as_ref()).unwrap());
        assert_eq!((img.width(), img.height()), (200, 40));
    }
}
