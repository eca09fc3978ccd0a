//! Per-plateau min/mean/max reduction and the plateau sources feeding it.

use std::ops::Range;

use crate::assembler::{Plateau, find_distinct_plateaus};
use crate::config::ScanParams;
use crate::error::{PlateauError, Result};
use crate::series::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl ChannelStats {
    /// Reduce one channel slice; `Err(offset)` points at the first non-finite value.
    fn from_values(values: &[f64]) -> std::result::Result<Self, usize> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(i);
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Ok(Self {
            min,
            mean: sum / values.len() as f64,
            max,
        })
    }
}

/// Stats of every analyzed channel over one plateau.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateauSummary {
    pub label: String,
    pub stats: Vec<(String, ChannelStats)>,
}

impl PlateauSummary {
    /// `{label}min`, `{label}mean`, `{label}max`.
    pub fn column_names(&self) -> [String; 3] {
        [
            format!("{}min", self.label),
            format!("{}mean", self.label),
            format!("{}max", self.label),
        ]
    }
}

/// Label of the n-th (0-based) plateau of a file.
pub fn plateau_label(index: usize) -> String {
    format!("Plateau_{}", index + 1)
}

pub fn summarize(
    series: &Series,
    rows: Range<usize>,
    channels: &[String],
    label: &str,
) -> Result<PlateauSummary> {
    if rows.is_empty() || rows.end > series.len() {
        return Err(PlateauError::InvalidParameter(format!(
            "cannot summarize rows {}..{} of a {}-row series",
            rows.start,
            rows.end,
            series.len()
        ))
        .into());
    }
    let mut stats = Vec::with_capacity(channels.len());
    for name in channels {
        let values = &series.require_channel(name)?[rows.clone()];
        let s = ChannelStats::from_values(values).map_err(|offset| PlateauError::DataQuality {
            channel: name.clone(),
            row: rows.start + offset,
        })?;
        stats.push((name.clone(), s));
    }
    Ok(PlateauSummary {
        label: label.to_string(),
        stats,
    })
}

/// One row per channel, three columns per plateau, plateaus left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    channels: Vec<String>,
    columns: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl SummaryTable {
    pub fn new(channels: Vec<String>) -> Self {
        let cells = vec![Vec::new(); channels.len()];
        Self {
            channels,
            columns: Vec::new(),
            cells,
        }
    }

    pub fn push(&mut self, summary: &PlateauSummary) -> Result<()> {
        let same_channels = summary.stats.len() == self.channels.len()
            && summary
                .stats
                .iter()
                .zip(&self.channels)
                .all(|((a, _), b)| a == b);
        if !same_channels {
            return Err(PlateauError::InvalidParameter(format!(
                "summary '{}' does not cover the table's channels",
                summary.label
            ))
            .into());
        }
        self.columns.extend(summary.column_names());
        for (row, (_, s)) in self.cells.iter_mut().zip(&summary.stats) {
            row.extend([s.min, s.mean, s.max]);
        }
        Ok(())
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn plateau_count(&self) -> usize {
        self.columns.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `(channel, values)` in column order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.channels
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(Vec::as_slice))
    }
}

/// Manually chosen plateau ranges; `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExplicitPlateauSpec {
    pub ranges: Vec<(usize, usize)>,
}

impl ExplicitPlateauSpec {
    pub fn new(ranges: Vec<(usize, usize)>) -> Self {
        Self { ranges }
    }

    fn to_plateaus(&self, series: &Series, key_channel: &str) -> Result<Vec<Plateau>> {
        let keys = series.require_channel(key_channel)?;
        self.ranges
            .iter()
            .map(|&(start, end)| {
                if start > end || end >= series.len() {
                    return Err(PlateauError::InvalidParameter(format!(
                        "explicit plateau {start}..={end} out of bounds for {} rows",
                        series.len()
                    ))
                    .into());
                }
                Ok(Plateau {
                    start,
                    end: end + 1,
                    key: keys[start],
                })
            })
            .collect()
    }
}

/// Where a file's plateaus come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlateauSource {
    AutoDetected(ScanParams),
    Explicit(ExplicitPlateauSpec),
}

impl PlateauSource {
    pub fn resolve(&self, series: &Series, channels: &[String]) -> Result<Vec<Plateau>> {
        match self {
            Self::AutoDetected(params) => find_distinct_plateaus(series, channels, *params),
            Self::Explicit(spec) => {
                let first = channels.first().ok_or_else(|| {
                    PlateauError::InvalidParameter("channel list is empty".into())
                })?;
                spec.to_plateaus(series, first)
            }
        }
    }
}

/// Summarize every plateau into one table, labelled `Plateau_1..n`.
pub fn summarize_plateaus(
    series: &Series,
    plateaus: &[Plateau],
    channels: &[String],
) -> Result<SummaryTable> {
    let mut table = SummaryTable::new(channels.to_vec());
    for (i, p) in plateaus.iter().enumerate() {
        let summary = summarize(series, p.rows(), channels, &plateau_label(i))?;
        table.push(&summary)?;
    }
    Ok(table)
}
