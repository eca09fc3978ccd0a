//! Time-axis synchronization on a reference temperature crossing.
//!
//! Runs of the same profile start at different wall-clock offsets. Shifting
//! every run so the reference channel passes `reference_temp` at t = 0 makes
//! them directly comparable.

use crate::config::TimeSync;
use crate::error::{PlateauError, Result};
use crate::series::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOutcome {
    /// Original timestamp mapped to zero.
    pub t0: f64,
    /// Leading rows dropped (before the channel first exceeded `window_low`).
    pub dropped_rows: usize,
}

/// Piecewise-linear interpolation of `x` over ascending `xs`, clamped at the ends.
fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (first, last) = (*xs.first()?, *xs.last()?);
    if x <= first {
        return ys.first().copied();
    }
    if x >= last {
        return ys.last().copied();
    }
    xs.windows(2).zip(ys.windows(2)).find_map(|(xw, yw)| {
        if xw[0] <= x && x <= xw[1] {
            let span = xw[1] - xw[0];
            if span == 0.0 {
                Some(yw[0])
            } else {
                Some(yw[0] + (x - xw[0]) / span * (yw[1] - yw[0]))
            }
        } else {
            None
        }
    })
}

/// Shift and rescale `series` time so that `channel` crosses the reference at zero.
///
/// Rows before the first reading above `window_low` are removed and the rest are
/// re-based to position 0.
pub fn synchronize(series: &mut Series, channel: &str, sync: &TimeSync) -> Result<SyncOutcome> {
    sync.validate()?;
    let values = series.require_channel(channel)?;
    let first_above = |limit: f64| values.iter().position(|&v| v > limit);
    let lo = first_above(sync.window_low).ok_or_else(|| {
        PlateauError::Sync(format!(
            "channel '{channel}' never exceeds {}",
            sync.window_low
        ))
    })?;
    let hi = first_above(sync.window_high).ok_or_else(|| {
        PlateauError::Sync(format!(
            "channel '{channel}' never exceeds {}",
            sync.window_high
        ))
    })?;

    let t0 = interp(
        sync.reference_temp,
        &values[lo..hi],
        &series.time()[lo..hi],
    )
    .filter(|t| t.is_finite())
    .ok_or_else(|| {
        PlateauError::Sync(format!(
            "cannot interpolate {} crossing of '{channel}' between rows {lo} and {hi}",
            sync.reference_temp
        ))
    })?;

    let scale = sync.time_scale;
    series.map_time(|t| (t - t0) * scale);
    series.skip_rows(lo);
    tracing::debug!(channel, t0, dropped_rows = lo, "time axis synchronized");
    Ok(SyncOutcome {
        t0,
        dropped_rows: lo,
    })
}
