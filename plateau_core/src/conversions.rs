//! `From` implementations bridging `plateau_config` types to `plateau_core` types.

use plateau_config::{AnalysisCfg, Config, LogTable, SyncCfg};

use crate::analysis::AnalysisOptions;
use crate::config::{ScanParams, TimeSync};
use crate::error::{PlateauError, Result};
use crate::series::Series;
use crate::summary::ExplicitPlateauSpec;

// ── ScanParams ───────────────────────────────────────────────────────────────

impl From<&AnalysisCfg> for ScanParams {
    fn from(c: &AnalysisCfg) -> Self {
        Self {
            tolerance: c.tolerance,
            num_points: c.num_points,
            step_size: c.step_size,
            plateau_threshold: c.plateau_threshold,
        }
    }
}

// ── TimeSync ─────────────────────────────────────────────────────────────────

impl From<&SyncCfg> for TimeSync {
    fn from(c: &SyncCfg) -> Self {
        Self {
            reference_temp: c.reference_temp,
            window_low: c.window_low,
            window_high: c.window_high,
            time_scale: c.time_scale,
        }
    }
}

// ── AnalysisOptions ──────────────────────────────────────────────────────────

impl From<&Config> for AnalysisOptions {
    fn from(c: &Config) -> Self {
        let a = &c.analysis;
        let pairs = c.explicit.pairs();
        Self {
            find_plateaus: a.find_plateaus,
            plot_data: a.plot_data,
            tolerance: a.tolerance,
            num_points: a.num_points,
            step_size: a.step_size,
            plateau_threshold: a.plateau_threshold,
            explicit: (!pairs.is_empty()).then(|| ExplicitPlateauSpec::new(pairs)),
            sync: c.sync.enabled.then(|| TimeSync::from(&c.sync)),
            channel_range: c.input.channel_range,
            channels: c.input.channels.clone(),
        }
    }
}

// ── Series ───────────────────────────────────────────────────────────────────

impl Series {
    /// Build a series from a loaded log; every non-time column becomes a channel.
    pub fn from_log(table: &LogTable, time_column: &str) -> Result<Self> {
        let time = table
            .column(time_column)
            .ok_or_else(|| PlateauError::UnknownChannel(time_column.to_string()))?;
        let mut series = Series::new(time);
        for name in table.columns.iter().filter(|c| c.as_str() != time_column) {
            let values = table
                .column(name)
                .ok_or_else(|| PlateauError::UnknownChannel(name.clone()))?;
            series.push_channel(name.clone(), values)?;
        }
        Ok(series)
    }
}
