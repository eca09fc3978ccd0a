#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and raw log loading for the plateau analysis tool.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The temperature log loader skips the instrument preamble/footer and
//!   tolerates malformed lines the way lab exports require.
use serde::Deserialize;
use serde::de::Deserializer;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisCfg {
    /// Run the automatic plateau search; when false the `[explicit]` ranges are used
    pub find_plateaus: bool,
    /// Export an overlay table marking plateau rows for plotting
    pub plot_data: bool,
    /// Max allowed (max - min) per channel inside one window
    pub tolerance: f64,
    /// Window length in rows (~30 s at the default logger rate)
    pub num_points: usize,
    /// Stride between window starts in rows
    pub step_size: usize,
    /// Minimum change of the first channel's starting value between plateaus
    pub plateau_threshold: f64,
}

impl Default for AnalysisCfg {
    fn default() -> Self {
        Self {
            find_plateaus: true,
            plot_data: false,
            tolerance: 0.4,
            num_points: 1350,
            step_size: 100,
            plateau_threshold: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputCfg {
    /// File extension picked up when a directory is given (without the dot)
    pub extension: String,
    /// Column names in file order
    pub columns: Vec<String>,
    /// Which of `columns` holds the timestamp
    pub time_column: String,
    /// Instrument preamble lines to skip
    pub skip_rows: usize,
    /// Trailing lines to drop
    pub skip_footer: usize,
    /// Single-byte field delimiter. Also accepts alias "separator".
    #[serde(alias = "separator", deserialize_with = "de_delimiter")]
    pub delimiter: u8,
    /// First-row values strictly inside this range mark a temperature channel
    pub channel_range: (f64, f64),
    /// Explicit channel list; overrides range-based selection when non-empty
    pub channels: Vec<String>,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            columns: ["ch1", "ch2", "ch3", "ch4", "time"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            time_column: "time".to_string(),
            skip_rows: 5,
            skip_footer: 1,
            delimiter: b',',
            channel_range: (10.0, 120.0),
            channels: Vec::new(),
        }
    }
}

fn de_delimiter<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.as_str() {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() == 1 {
                Ok(bytes[0])
            } else {
                Err(serde::de::Error::custom(format!(
                    "delimiter must be a single byte, got {s:?}"
                )))
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncCfg {
    /// Shift timestamps so the first channel reaches `reference_temp` at t = 0
    pub enabled: bool,
    pub reference_temp: f64,
    /// Interpolation bracket: first rows above these temperatures
    pub window_low: f64,
    pub window_high: f64,
    /// Multiplier applied after shifting (ms -> s by default)
    pub time_scale: f64,
}

impl Default for SyncCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_temp: 40.0,
            window_low: 35.0,
            window_high: 45.0,
            time_scale: 0.001,
        }
    }
}

/// Manual plateau ranges (row positions after sync, end inclusive).
///
/// Accepts either parallel lists or a list of pairs:
/// - `start = [3650, 7150]` + `end = [4999, 8499]`
/// - `ranges = [[3650, 4999], [7150, 8499]]`
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExplicitCfg {
    pub start: Vec<usize>,
    pub end: Vec<usize>,
    #[serde(deserialize_with = "de_ranges")]
    pub ranges: Vec<(usize, usize)>,
}

impl Default for ExplicitCfg {
    fn default() -> Self {
        Self {
            start: vec![3650, 7150, 10550, 13750, 17250],
            end: vec![4999, 8499, 11899, 15099, 18599],
            ranges: Vec::new(),
        }
    }
}

impl ExplicitCfg {
    /// Ordered (start, end) pairs; `ranges` wins when both forms are present.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        if self.ranges.is_empty() {
            self.start
                .iter()
                .copied()
                .zip(self.end.iter().copied())
                .collect()
        } else {
            self.ranges.clone()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangeToml {
    Tuple((usize, usize)),
    Table { start: usize, end: usize },
}

fn de_ranges<'de, D>(deserializer: D) -> Result<Vec<(usize, usize)>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<Vec<RangeToml>> = Option::deserialize(deserializer)?;
    let mut out = Vec::new();
    if let Some(items) = opt {
        for r in items {
            match r {
                RangeToml::Tuple(pair) => out.push(pair),
                RangeToml::Table { start, end } => out.push((start, end)),
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputCfg {
    /// Directory receiving `<stem>_summary.csv` / `<stem>_overlay.csv`
    pub dir: String,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisCfg,
    pub input: InputCfg,
    pub sync: SyncCfg,
    pub explicit: ExplicitCfg,
    pub output: OutputCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Analysis
        let a = &self.analysis;
        if !(a.tolerance.is_finite() && a.tolerance > 0.0) {
            eyre::bail!("analysis.tolerance must be > 0");
        }
        if a.num_points == 0 {
            eyre::bail!("analysis.num_points must be >= 1");
        }
        if a.step_size == 0 {
            eyre::bail!("analysis.step_size must be >= 1");
        }
        if !(a.plateau_threshold.is_finite() && a.plateau_threshold >= 0.0) {
            eyre::bail!("analysis.plateau_threshold must be >= 0");
        }

        // Input
        let i = &self.input;
        if i.columns.is_empty() {
            eyre::bail!("input.columns must not be empty");
        }
        if !i.columns.iter().any(|c| c == &i.time_column) {
            eyre::bail!(
                "input.time_column '{}' is not one of input.columns",
                i.time_column
            );
        }
        for (idx, c) in i.columns.iter().enumerate() {
            if i.columns[..idx].contains(c) {
                eyre::bail!("input.columns contains duplicate column '{c}'");
            }
        }
        if let Some(c) = i.channels.iter().find(|c| !i.columns.contains(c)) {
            eyre::bail!("input.channels references unknown column '{c}'");
        }
        if i.channels.contains(&i.time_column) {
            eyre::bail!("input.channels must not include the time column");
        }
        let (lo, hi) = i.channel_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            eyre::bail!("input.channel_range must be a finite [low, high] with low < high");
        }

        // Sync
        let s = &self.sync;
        if s.enabled {
            if s.window_low >= s.window_high {
                eyre::bail!("sync.window_low must be < sync.window_high");
            }
            if s.reference_temp < s.window_low || s.reference_temp > s.window_high {
                eyre::bail!("sync.reference_temp must lie within [window_low, window_high]");
            }
            if !(s.time_scale.is_finite() && s.time_scale > 0.0) {
                eyre::bail!("sync.time_scale must be > 0");
            }
        }

        // Explicit ranges
        let e = &self.explicit;
        if e.ranges.is_empty() && e.start.len() != e.end.len() {
            eyre::bail!(
                "explicit.start and explicit.end must have equal length ({} vs {})",
                e.start.len(),
                e.end.len()
            );
        }
        for (s, end) in e.pairs() {
            if s > end {
                eyre::bail!("explicit range start {s} is after end {end}");
            }
        }
        if !a.find_plateaus && e.pairs().is_empty() {
            eyre::bail!("analysis.find_plateaus = false requires [explicit] ranges");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{r}'");
        }

        Ok(())
    }
}

/// A raw temperature log as read from disk: named numeric columns, row-major.
///
/// Cells that fail to parse are kept as `NaN` so the analysis can report
/// exactly where the data is bad instead of silently dropping rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    /// Lines dropped because their field count did not match `columns`
    pub skipped_lines: usize,
}

impl LogTable {
    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }
}

/// Load a temperature log using the `[input]` layout.
pub fn load_log(path: &std::path::Path, input: &InputCfg) -> eyre::Result<LogTable> {
    let bytes =
        std::fs::read(path).map_err(|e| eyre::eyre!("open temperature log {:?}: {}", path, e))?;
    parse_log(&String::from_utf8_lossy(&bytes), input)
}

/// Parse log text (see [`load_log`]); split out so tests need no files.
pub fn parse_log(text: &str, input: &InputCfg) -> eyre::Result<LogTable> {
    let lines: Vec<&str> = text.lines().collect();
    let end = lines.len().saturating_sub(input.skip_footer);
    let body = if input.skip_rows < end {
        lines[input.skip_rows..end].join("\n")
    } else {
        String::new()
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(input.delimiter)
        .from_reader(body.as_bytes());

    let width = input.columns.len();
    let mut rows = Vec::new();
    let mut skipped_lines = 0usize;
    for (idx, rec) in rdr.records().enumerate() {
        let record = rec.map_err(|e| {
            eyre::eyre!("invalid log line {}: {}", idx + input.skip_rows + 1, e)
        })?;
        if record.len() != width {
            skipped_lines += 1;
            continue;
        }
        let row = record
            .iter()
            .map(|cell| cell.trim().parse::<f64>().unwrap_or(f64::NAN))
            .collect();
        rows.push(row);
    }

    Ok(LogTable {
        columns: input.columns.clone(),
        rows,
        skipped_lines,
    })
}
