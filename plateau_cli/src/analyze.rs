//! Batch analysis: file discovery, per-file pipeline, result reporting.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use plateau_config::{Config, load_log};
use plateau_core::{
    AnalysisOptions, FileReport, Series, SummarySink, analyze_series, plateau_label,
    resolve_channels, select_temperature_channels,
};
use serde_json::json;

use crate::cli::JSON_MODE;
use crate::error_fmt::{format_error_json, humanize};
use crate::export::{CsvSummarySink, file_stem, overlay_path, write_overlay};

/// CLI overrides layered over the config file.
#[derive(Debug, Default)]
pub struct AnalyzeArgs {
    pub inputs: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub num_points: Option<usize>,
    pub step_size: Option<usize>,
    pub plateau_threshold: Option<f64>,
    pub explicit: bool,
    pub plot: bool,
    pub no_sync: bool,
}

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

pub fn build_options(cfg: &Config, args: &AnalyzeArgs) -> AnalysisOptions {
    let mut opts = AnalysisOptions::from(cfg);
    if let Some(t) = args.tolerance {
        opts.tolerance = t;
    }
    if let Some(n) = args.num_points {
        opts.num_points = n;
    }
    if let Some(s) = args.step_size {
        opts.step_size = s;
    }
    if let Some(p) = args.plateau_threshold {
        opts.plateau_threshold = p;
    }
    if args.explicit {
        opts.find_plateaus = false;
    }
    if args.plot {
        opts.plot_data = true;
    }
    if args.no_sync {
        opts.sync = None;
    }
    opts
}

/// Expand directories (non-recursive, by extension) and keep files as given.
pub fn discover_files(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .wrap_err_with(|| format!("read directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
                .collect();
            found.sort();
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            eyre::bail!("input {} does not exist", input.display());
        }
    }
    Ok(files)
}

fn sheet_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// One sheet name per file; outputs are keyed by stem, so files sharing a stem
/// are prefixed with their parent directory (and numbered if that still clashes).
fn sheet_names(files: &[PathBuf]) -> Vec<String> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for f in files {
        *stem_counts.entry(file_stem(&sheet_name(f))).or_default() += 1;
    }

    let mut taken: HashMap<String, usize> = HashMap::new();
    files
        .iter()
        .map(|f| {
            let base = sheet_name(f);
            let mut name = if stem_counts[&file_stem(&base)] > 1 {
                let parent = f
                    .parent()
                    .and_then(Path::file_name)
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::warn!(
                    file = %f.display(),
                    "another input has the same file stem; prefixing outputs with its directory"
                );
                if parent.is_empty() {
                    base
                } else {
                    format!("{parent}_{base}")
                }
            } else {
                base
            };
            let seen = taken.entry(file_stem(&name)).or_default();
            *seen += 1;
            if *seen > 1 {
                let n = *seen;
                name = format!("{}_{n}", file_stem(&name));
            }
            name
        })
        .collect()
}

fn load_series(path: &Path, cfg: &Config) -> Result<Series> {
    let table = load_log(path, &cfg.input)?;
    if table.skipped_lines > 0 {
        tracing::warn!(
            file = %path.display(),
            skipped = table.skipped_lines,
            "skipped malformed lines"
        );
    }
    Series::from_log(&table, &cfg.input.time_column)
}

fn process_file(
    path: &Path,
    sheet: &str,
    cfg: &Config,
    opts: &AnalysisOptions,
    sink: &mut CsvSummarySink,
    out_dir: &Path,
) -> Result<FileReport> {
    let series = load_series(path, cfg)?;
    let report = analyze_series(series, opts)?;
    sink.write_table(sheet, &report.summary)
        .map_err(|e| eyre::eyre!("write summary for {sheet}: {e}"))?;
    if opts.plot_data {
        write_overlay(&overlay_path(out_dir, sheet), &report)?;
    }
    Ok(report)
}

fn report_success(path: &Path, report: &FileReport, summary_path: &Path) {
    let time = report.series.time();
    if json_mode() {
        let plateaus: Vec<_> = report
            .plateaus
            .iter()
            .enumerate()
            .map(|(i, p)| {
                json!({
                    "label": plateau_label(i),
                    "start": p.first_row(),
                    "end": p.last_row(),
                    "key": p.key,
                    "t_start": time[p.first_row()],
                    "t_end": time[p.last_row()],
                })
            })
            .collect();
        let line = json!({
            "file": path.display().to_string(),
            "status": "ok",
            "channels": report.channels,
            "plateaus": plateaus,
            "summary": summary_path.display().to_string(),
        });
        println!("{line}");
        return;
    }
    println!(
        "{}: {} plateau(s) on {}",
        path.display(),
        report.plateaus.len(),
        report.channels.join(",")
    );
    for (i, p) in report.plateaus.iter().enumerate() {
        println!(
            "  {} rows {}..={} t={:.1}..{:.1}s {}={:.2}",
            plateau_label(i),
            p.first_row(),
            p.last_row(),
            time[p.first_row()],
            time[p.last_row()],
            report.channels[0],
            p.key
        );
    }
}

fn report_failure(path: &Path, err: &eyre::Report) {
    tracing::warn!(file = %path.display(), error = %err, "skipping file");
    if json_mode() {
        let line = json!({
            "file": path.display().to_string(),
            "status": "error",
            "error": serde_json::from_str::<serde_json::Value>(&format_error_json(err))
                .unwrap_or_else(|_| json!(err.to_string())),
        });
        println!("{line}");
    } else {
        eprintln!("{}: skipped\n{}", path.display(), humanize(err));
    }
}

/// Analyze every input; a failing file is reported and skipped.
///
/// Errors only when no file was found or every file failed; in the latter case
/// the first failure is returned so its kind drives the exit code.
pub fn run_analyze(cfg: &Config, args: &AnalyzeArgs) -> Result<()> {
    let opts = build_options(cfg, args);
    // Reject bad parameters once, before reading any file.
    opts.source()?;
    if opts.find_plateaus {
        opts.scan_params().validate()?;
    }
    if let Some(sync) = &opts.sync {
        sync.validate()?;
    }

    let files = discover_files(&args.inputs, &cfg.input.extension)?;
    if files.is_empty() {
        eyre::bail!("no input files found (extension '{}')", cfg.input.extension);
    }

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir));
    fs::create_dir_all(&out_dir)
        .wrap_err_with(|| format!("create output directory {}", out_dir.display()))?;
    let mut sink = CsvSummarySink::new(&out_dir);

    let mut ok = 0usize;
    let mut first_err = None;
    let sheets = sheet_names(&files);
    for (path, sheet) in files.iter().zip(&sheets) {
        let _span = tracing::info_span!("file", path = %path.display()).entered();
        match process_file(path, sheet, cfg, &opts, &mut sink, &out_dir) {
            Ok(report) => {
                ok += 1;
                report_success(path, &report, &sink.path_for(sheet));
            }
            Err(e) => {
                report_failure(path, &e);
                first_err.get_or_insert(e);
            }
        }
    }
    tracing::info!(files = files.len(), ok, "analysis finished");

    match first_err {
        Some(e) if ok == 0 => Err(e.wrap_err(format!("all {} input file(s) failed", files.len()))),
        _ => Ok(()),
    }
}

/// Print the channels that `analyze` would use for `file`.
pub fn run_channels(cfg: &Config, file: &Path) -> Result<()> {
    let series = load_series(file, cfg)?;
    let channels = if cfg.input.channels.is_empty() {
        let (lo, hi) = cfg.input.channel_range;
        select_temperature_channels(&series, lo, hi)
    } else {
        resolve_channels(&series, &cfg.input.channels)?
    };
    if json_mode() {
        println!(
            "{}",
            json!({ "file": file.display().to_string(), "rows": series.len(), "channels": channels })
        );
    } else {
        println!("{} ({} rows): {}", file.display(), series.len(), channels.join(","));
    }
    Ok(())
}
