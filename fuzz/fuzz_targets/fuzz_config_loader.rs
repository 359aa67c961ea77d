#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic.
    let Ok(cfg) = machines_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        let settings = machines_core::ApiSettings::from(&cfg.api);
        assert!(!settings.timeout.is_zero());
    }
});
