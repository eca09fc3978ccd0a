//! Fixed-window stability scan.

use crate::config::ScanParams;
use crate::error::{PlateauError, Result};
use crate::series::Series;

/// Outcome of testing one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowVerdict {
    /// First row of the window.
    pub start: usize,
    pub stable: bool,
}

/// Range (max - min) of a window, or the offset of the first non-finite value.
pub(crate) fn window_range(values: &[f64]) -> std::result::Result<f64, usize> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(i);
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Ok(hi - lo)
}

/// Lazily evaluates windows at `0, step, 2*step, ...` while `start + num_points <= len`.
///
/// Yields `Err(DataQuality)` on the first window containing a missing reading
/// and stops afterwards.
#[derive(Debug)]
pub struct StabilityScanner<'a> {
    columns: Vec<(&'a str, &'a [f64])>,
    params: ScanParams,
    len: usize,
    next_start: usize,
    failed: bool,
}

impl<'a> StabilityScanner<'a> {
    /// Validates parameters and channels before any window is touched.
    pub fn new(series: &'a Series, channels: &'a [String], params: ScanParams) -> Result<Self> {
        params.validate()?;
        if channels.is_empty() {
            return Err(PlateauError::InvalidParameter("channel list is empty".into()).into());
        }
        let columns = channels
            .iter()
            .map(|c| series.require_channel(c).map(|v| (c.as_str(), v)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns,
            params,
            len: series.len(),
            next_start: 0,
            failed: false,
        })
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Number of windows a full scan evaluates.
    pub fn window_count(&self) -> usize {
        if self.len < self.params.num_points {
            0
        } else {
            (self.len - self.params.num_points) / self.params.step_size + 1
        }
    }

    fn evaluate(&self, start: usize) -> Result<bool> {
        let end = start + self.params.num_points;
        for (name, values) in &self.columns {
            match window_range(&values[start..end]) {
                Ok(range) if range <= self.params.tolerance => {}
                Ok(_) => return Ok(false),
                Err(offset) => {
                    return Err(PlateauError::DataQuality {
                        channel: (*name).to_string(),
                        row: start + offset,
                    }
                    .into());
                }
            }
        }
        Ok(true)
    }
}

impl Iterator for StabilityScanner<'_> {
    type Item = Result<WindowVerdict>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let start = self.next_start;
        if start.checked_add(self.params.num_points)? > self.len {
            return None;
        }
        self.next_start = start.saturating_add(self.params.step_size);
        match self.evaluate(start) {
            Ok(stable) => Some(Ok(WindowVerdict { start, stable })),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
