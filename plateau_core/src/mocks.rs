use crate::sink::SummarySink;
use crate::summary::SummaryTable;

/// In-memory sink for tests; keeps sheets in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub sheets: Vec<(String, SummaryTable)>,
}

impl SummarySink for MemorySink {
    fn write_table(
        &mut self,
        sheet: &str,
        table: &SummaryTable,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sheets.retain(|(name, _)| name != sheet);
        self.sheets.push((sheet.to_string(), table.clone()));
        Ok(())
    }
}
