//! Column-major time series of named channels.

use std::ops::Range;

use crate::error::{PlateauError, Result};

/// An ordered, time-ascending table: one time column plus named channels.
///
/// Row positions are significant; plateaus and explicit ranges refer to them.
/// Missing readings are stored as `NaN` and reported when a computation touches them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    time: Vec<f64>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Series {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Append a channel, builder style.
    pub fn with_channel(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.push_channel(name, values)?;
        Ok(self)
    }

    pub fn push_channel(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.time.len() {
            return Err(PlateauError::InvalidParameter(format!(
                "channel '{name}' has {} rows, time column has {}",
                values.len(),
                self.time.len()
            ))
            .into());
        }
        if self.has_channel(&name) {
            return Err(PlateauError::InvalidParameter(format!("duplicate channel '{name}'")).into());
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Like [`Series::channel`] but a missing name is an error.
    pub fn require_channel(&self, name: &str) -> Result<&[f64]> {
        self.channel(name)
            .ok_or_else(|| PlateauError::UnknownChannel(name.to_string()).into())
    }

    pub fn channel_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Owned copy of a row range; row positions in the copy start at 0.
    pub fn slice(&self, rows: Range<usize>) -> Result<Series> {
        if rows.start > rows.end || rows.end > self.len() {
            return Err(PlateauError::InvalidParameter(format!(
                "row range {}..{} out of bounds for series of {} rows",
                rows.start,
                rows.end,
                self.len()
            ))
            .into());
        }
        Ok(Series {
            time: self.time[rows.clone()].to_vec(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[rows.clone()].to_vec()).collect(),
        })
    }

    /// Drop the first `n` rows; remaining rows are re-based to position 0.
    pub fn skip_rows(&mut self, n: usize) {
        let n = n.min(self.len());
        self.time.drain(..n);
        for c in &mut self.columns {
            c.drain(..n);
        }
    }

    /// Rewrite every timestamp in place.
    pub fn map_time(&mut self, f: impl Fn(f64) -> f64) {
        for t in &mut self.time {
            *t = f(*t);
        }
    }
}
