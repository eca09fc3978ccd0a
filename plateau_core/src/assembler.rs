//! Turns the scanner's stable/unstable stream into distinct plateaus.

use std::ops::Range;

use crate::config::ScanParams;
use crate::error::Result;
use crate::scanner::{StabilityScanner, WindowVerdict};
use crate::series::Series;

/// A run of rows judged stable, as a half-open range into the scanned series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plateau {
    pub start: usize,
    pub end: usize,
    /// First analyzed channel's value at `start`; drives the distinctness filter.
    pub key: f64,
}

impl Plateau {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// First row position (inclusive).
    pub fn first_row(&self) -> usize {
        self.start
    }

    /// Last row position (inclusive).
    pub fn last_row(&self) -> usize {
        self.end.saturating_sub(1)
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Owned copy of the plateau's rows.
    pub fn to_series(&self, series: &Series) -> Result<Series> {
        series.slice(self.rows())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoCurrent,
    /// Holds only the most recent stable window; later stable windows replace it.
    Accumulating { start: usize },
}

/// One-shot iterator over accepted plateaus, in scan order.
///
/// A candidate is the last stable window before the stream turns unstable (or ends).
/// It is accepted when it is the first one, or when its key differs from the
/// previously accepted key by at least `plateau_threshold`.
#[derive(Debug)]
pub struct PlateauAssembler<'a> {
    scanner: StabilityScanner<'a>,
    key_channel: &'a [f64],
    state: State,
    last_key: Option<f64>,
    exhausted: bool,
}

impl<'a> PlateauAssembler<'a> {
    pub fn new(series: &'a Series, channels: &'a [String], params: ScanParams) -> Result<Self> {
        let scanner = StabilityScanner::new(series, channels, params)?;
        // Non-empty and present: checked by the scanner.
        let key_channel = series.require_channel(&channels[0])?;
        Ok(Self {
            scanner,
            key_channel,
            state: State::NoCurrent,
            last_key: None,
            exhausted: false,
        })
    }

    fn on_verdict(&mut self, v: WindowVerdict) -> Option<Plateau> {
        if v.stable {
            self.state = State::Accumulating { start: v.start };
            return None;
        }
        self.flush()
    }

    /// Finalize the current candidate, if any, and return to `NoCurrent`.
    fn flush(&mut self) -> Option<Plateau> {
        let State::Accumulating { start } = std::mem::replace(&mut self.state, State::NoCurrent)
        else {
            return None;
        };
        // Replace semantics: the candidate is exactly one window long.
        let candidate = Plateau {
            start,
            end: start + self.scanner.params().num_points,
            key: self.key_channel[start],
        };
        let threshold = self.scanner.params().plateau_threshold;
        match self.last_key {
            Some(prev) if (candidate.key - prev).abs() < threshold => {
                tracing::debug!(
                    start = candidate.start,
                    key = candidate.key,
                    prev_key = prev,
                    "plateau dropped as continuation of previous"
                );
                None
            }
            _ => {
                tracing::debug!(
                    start = candidate.start,
                    end = candidate.end,
                    key = candidate.key,
                    "plateau accepted"
                );
                self.last_key = Some(candidate.key);
                Some(candidate)
            }
        }
    }
}

impl Iterator for PlateauAssembler<'_> {
    type Item = Result<Plateau>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.scanner.next() {
                Some(Ok(v)) => {
                    if let Some(p) = self.on_verdict(v) {
                        return Some(Ok(p));
                    }
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
                None => {
                    self.exhausted = true;
                    return self.flush().map(Ok);
                }
            }
        }
    }
}

/// Run a full scan and collect the accepted plateaus.
///
/// An empty vector is a valid outcome (series shorter than one window, or
/// nothing stable).
pub fn find_distinct_plateaus(
    series: &Series,
    channels: &[String],
    params: ScanParams,
) -> Result<Vec<Plateau>> {
    let plateaus = PlateauAssembler::new(series, channels, params)?.collect::<Result<Vec<_>>>()?;
    tracing::info!(
        rows = series.len(),
        found = plateaus.len(),
        "plateau scan complete"
    );
    Ok(plateaus)
}

/// Row mask marking every row covered by at least one plateau.
pub fn plateau_mask(len: usize, plateaus: &[Plateau]) -> Vec<bool> {
    let mut mask = vec![false; len];
    for p in plateaus {
        let end = p.end.min(len);
        if p.start < end {
            mask[p.start..end].iter_mut().for_each(|m| *m = true);
        }
    }
    mask
}
