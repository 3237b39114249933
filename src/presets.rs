//! Bar configurations used by the dashboard widgets.

use crate::config::{Orientation, ProgressBarConfig};
use crate::foundation::core::Color;
use crate::foundation::error::{BarError, BarResult};

/// Block span the halving bar measures progress against.
pub const HALVING_BAR_SPAN_BLOCKS: u64 = 216_000;

/// Wide, thin bar showing progress towards the next subsidy halving.
pub fn halving_bar(blocks_until_next_halving: u64) -> BarResult<ProgressBarConfig> {
    let remaining = blocks_until_next_halving as f64 / HALVING_BAR_SPAN_BLOCKS as f64;
    ProgressBarConfig::builder()
        .size(600.0, 12.0)
        .fill_color(Color::WHITE)
        .background_color(Color::TRANSPARENT)
        .corner_radius(12.0)
        .percentage(100.0 * (1.0 - remaining))
        .build()
}

/// Narrow vertical gauge of mempool memory usage.
pub fn mempool_usage_bar(usage_bytes: u64, max_bytes: u64) -> BarResult<ProgressBarConfig> {
    if max_bytes == 0 {
        return Err(BarError::progress("mempool maximum must be > 0"));
    }
    let pct = round_significant(usage_bytes as f64 / max_bytes as f64 * 100.0, 3);
    ProgressBarConfig::builder()
        .orientation(Orientation::Vertical)
        .size(12.0, 100.0)
        .fill_color(Color::WHITE)
        .background_color(Color::TRANSPARENT)
        .corner_radius(12.0)
        .percentage(pct)
        .build()
}

/// Round to `digits` significant digits.
pub fn round_significant(v: f64, digits: i32) -> f64 {
    if v == 0.0 || !v.is_finite() {
        return v;
    }
    let magnitude = v.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    (v * factor).round() / factor
}
