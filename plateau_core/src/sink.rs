/// Destination for per-file summary tables (spreadsheet, CSV, memory).
pub trait SummarySink {
    /// Store `table` under `sheet`, replacing any previous table of that name.
    fn write_table(
        &mut self,
        sheet: &str,
        table: &crate::summary::SummaryTable,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
