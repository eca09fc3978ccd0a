//! Runtime parameter types for the plateau search.
//!
//! These are separate from the TOML-deserialized config in `plateau_config`;
//! see `conversions` for the mapping.

use crate::error::{PlateauError, Result};

/// Stride used when a caller does not pick one.
pub const DEFAULT_STEP_SIZE: usize = 200;

/// Window/stride/tolerance settings for one scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    /// Max allowed (max - min) per channel within one window, inclusive.
    pub tolerance: f64,
    /// Window length in rows; also the minimum plateau length.
    pub num_points: usize,
    /// Rows between successive window starts.
    pub step_size: usize,
    /// Minimum |key change| between consecutive accepted plateaus.
    pub plateau_threshold: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            tolerance: 0.4,
            num_points: 1350,
            step_size: DEFAULT_STEP_SIZE,
            plateau_threshold: 1.0,
        }
    }
}

impl ScanParams {
    /// Reject settings that would make the scan meaningless or non-terminating.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(invalid(format!("tolerance must be > 0, got {}", self.tolerance)));
        }
        if self.num_points == 0 {
            return Err(invalid("num_points must be > 0".to_string()));
        }
        if self.step_size == 0 {
            return Err(invalid("step_size must be > 0".to_string()));
        }
        if !(self.plateau_threshold.is_finite() && self.plateau_threshold >= 0.0) {
            return Err(invalid(format!(
                "plateau_threshold must be >= 0, got {}",
                self.plateau_threshold
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> eyre::Report {
    PlateauError::InvalidParameter(msg).into()
}

/// Parameters for shifting the time axis to a reference crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSync {
    /// Temperature the reference channel crosses at t = 0.
    pub reference_temp: f64,
    /// First row above this starts the interpolation bracket (and the kept data).
    pub window_low: f64,
    /// First row above this ends the interpolation bracket.
    pub window_high: f64,
    /// Multiplier applied to shifted timestamps.
    pub time_scale: f64,
}

impl Default for TimeSync {
    fn default() -> Self {
        Self {
            reference_temp: 40.0,
            window_low: 35.0,
            window_high: 45.0,
            time_scale: 0.001,
        }
    }
}

impl TimeSync {
    /// Reject windows that cannot bracket the reference crossing.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.reference_temp,
            self.window_low,
            self.window_high,
            self.time_scale,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid(format!("time sync values must be finite: {self:?}")));
        }
        if self.window_low >= self.window_high {
            return Err(invalid(format!(
                "sync window_low ({}) must be < window_high ({})",
                self.window_low, self.window_high
            )));
        }
        if self.reference_temp < self.window_low || self.reference_temp > self.window_high {
            return Err(invalid(format!(
                "sync reference_temp {} must lie within [{}, {}]",
                self.reference_temp, self.window_low, self.window_high
            )));
        }
        if self.time_scale <= 0.0 {
            return Err(invalid(format!(
                "sync time_scale must be > 0, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}
