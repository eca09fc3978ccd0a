//! CSV writers for summary tables and plot overlays.

use std::path::{Path, PathBuf};

use plateau_core::{FileReport, SummarySink, SummaryTable};

/// Writes each sheet to `<dir>/<stem>_summary.csv`, overwriting earlier runs.
pub struct CsvSummarySink {
    dir: PathBuf,
}

impl CsvSummarySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}_summary.csv", file_stem(sheet)))
    }
}

pub(crate) fn file_stem(sheet: &str) -> String {
    Path::new(sheet)
        .file_stem()
        .map_or_else(|| sheet.to_string(), |s| s.to_string_lossy().into_owned())
}

impl SummarySink for CsvSummarySink {
    fn write_table(
        &mut self,
        sheet: &str,
        table: &SummaryTable,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut w = csv::Writer::from_path(self.path_for(sheet))?;
        let mut header = vec!["channel".to_string()];
        header.extend(table.column_names().iter().cloned());
        w.write_record(&header)?;
        for (channel, values) in table.rows() {
            let mut record = vec![channel.to_string()];
            record.extend(values.iter().map(|v| format!("{v:.4}")));
            w.write_record(&record)?;
        }
        w.flush()?;
        Ok(())
    }
}

/// Raw series plus an `in_plateau` flag per row, for an external plotter.
pub fn write_overlay(path: &Path, report: &FileReport) -> eyre::Result<()> {
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create overlay {:?}: {}", path, e))?;
    let mut header = vec!["time".to_string()];
    header.extend(report.channels.iter().cloned());
    header.push("in_plateau".to_string());
    w.write_record(&header)?;

    let columns = report
        .channels
        .iter()
        .map(|c| report.series.require_channel(c))
        .collect::<plateau_core::Result<Vec<_>>>()?;
    let mask = report.overlay_mask();
    for (row, (t, in_plateau)) in report.series.time().iter().zip(&mask).enumerate() {
        let mut record = vec![format!("{t}")];
        record.extend(columns.iter().map(|c| format!("{}", c[row])));
        record.push(u8::from(*in_plateau).to_string());
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

pub fn overlay_path(dir: &Path, sheet: &str) -> PathBuf {
    dir.join(format!("{}_overlay.csv", file_stem(sheet)))
}
