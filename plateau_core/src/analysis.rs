//! Per-file analysis pipeline: channel selection, time sync, plateau
//! resolution and summarization, driven by one explicit options value.

use crate::assembler::{Plateau, plateau_mask};
use crate::channels::{resolve_channels, select_temperature_channels};
use crate::config::{DEFAULT_STEP_SIZE, ScanParams, TimeSync};
use crate::error::{PlateauError, Result};
use crate::series::Series;
use crate::summary::{ExplicitPlateauSpec, PlateauSource, SummaryTable, summarize_plateaus};
use crate::sync::{SyncOutcome, synchronize};

/// Everything that controls one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Auto-detect plateaus; when false `explicit` must be set.
    pub find_plateaus: bool,
    /// Caller wants an overlay for plotting; the pipeline itself only reports it.
    pub plot_data: bool,
    pub tolerance: f64,
    pub num_points: usize,
    pub step_size: usize,
    pub plateau_threshold: f64,
    pub explicit: Option<ExplicitPlateauSpec>,
    pub sync: Option<TimeSync>,
    /// Open interval used to pick temperature channels by first reading.
    pub channel_range: (f64, f64),
    /// Fixed channel list; empty means pick by `channel_range`.
    pub channels: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        let scan = ScanParams::default();
        Self {
            find_plateaus: true,
            plot_data: false,
            tolerance: scan.tolerance,
            num_points: scan.num_points,
            step_size: DEFAULT_STEP_SIZE,
            plateau_threshold: scan.plateau_threshold,
            explicit: None,
            sync: Some(TimeSync::default()),
            channel_range: (10.0, 120.0),
            channels: Vec::new(),
        }
    }
}

impl AnalysisOptions {
    pub fn scan_params(&self) -> ScanParams {
        ScanParams {
            tolerance: self.tolerance,
            num_points: self.num_points,
            step_size: self.step_size,
            plateau_threshold: self.plateau_threshold,
        }
    }

    pub fn source(&self) -> Result<PlateauSource> {
        if self.find_plateaus {
            return Ok(PlateauSource::AutoDetected(self.scan_params()));
        }
        self.explicit
            .clone()
            .map(PlateauSource::Explicit)
            .ok_or_else(|| {
                PlateauError::InvalidParameter(
                    "explicit plateau ranges required when find_plateaus is off".into(),
                )
                .into()
            })
    }
}

/// Result of analyzing one file's series.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub channels: Vec<String>,
    /// The series after synchronization; plateau ranges index into it.
    pub series: Series,
    pub sync: Option<SyncOutcome>,
    pub plateaus: Vec<Plateau>,
    pub summary: SummaryTable,
}

impl FileReport {
    /// Rows covered by any plateau, for overlaying on a plot of `series`.
    pub fn overlay_mask(&self) -> Vec<bool> {
        plateau_mask(self.series.len(), &self.plateaus)
    }
}

pub fn analyze_series(mut series: Series, opts: &AnalysisOptions) -> Result<FileReport> {
    // Fail on bad parameters before touching data.
    let source = opts.source()?;
    if let PlateauSource::AutoDetected(params) = &source {
        params.validate()?;
    }
    if let Some(sync) = &opts.sync {
        sync.validate()?;
    }

    let channels = if opts.channels.is_empty() {
        let (lo, hi) = opts.channel_range;
        select_temperature_channels(&series, lo, hi)
    } else {
        resolve_channels(&series, &opts.channels)?
    };
    if channels.is_empty() {
        return Err(PlateauError::InvalidParameter(format!(
            "no temperature channels found (first reading within {:?})",
            opts.channel_range
        ))
        .into());
    }

    let sync = match &opts.sync {
        Some(cfg) => Some(synchronize(&mut series, &channels[0], cfg)?),
        None => None,
    };

    let plateaus = source.resolve(&series, &channels)?;
    let summary = summarize_plateaus(&series, &plateaus, &channels)?;
    tracing::info!(
        channels = channels.len(),
        plateaus = plateaus.len(),
        "series analyzed"
    );
    Ok(FileReport {
        channels,
        series,
        sync,
        plateaus,
        summary,
    })
}
