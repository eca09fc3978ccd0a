#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let input = plateau_config::InputCfg::default();
    if let Ok(table) = plateau_config::parse_log(&text, &input) {
        for row in &table.rows {
            assert_eq!(row.len(), input.columns.len());
        }
    }
});
