#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML parsing and validation must reject bad input without panicking.
    if let Ok(cfg) = toml::from_str::<plateau_config::Config>(data) {
        let _ = cfg.validate();
        let _ = cfg.explicit.pairs();
    }
});
