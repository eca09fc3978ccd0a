//! Choosing which columns take part in the stability analysis.

use crate::error::{PlateauError, Result};
use crate::series::Series;

/// Channels whose first reading lies strictly inside `(lo, hi)`.
///
/// Loggers export unused inputs and metadata columns next to the real probes;
/// those start far outside any plausible temperature and are filtered out here.
pub fn select_temperature_channels(series: &Series, lo: f64, hi: f64) -> Vec<String> {
    series
        .channel_names()
        .iter()
        .filter(|name| {
            series
                .channel(name)
                .and_then(|v| v.first())
                .is_some_and(|&first| first > lo && first < hi)
        })
        .cloned()
        .collect()
}

/// Validate a caller-supplied channel list against the series.
pub fn resolve_channels(series: &Series, requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        return Err(PlateauError::InvalidParameter("channel list is empty".into()).into());
    }
    if let Some(missing) = requested.iter().find(|c| !series.has_channel(c)) {
        return Err(PlateauError::UnknownChannel(missing.clone()).into());
    }
    Ok(requested.to_vec())
}
