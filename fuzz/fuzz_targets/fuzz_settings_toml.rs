//! Fuzz target for sensor settings parsing.
//!
//! Tests `SensorSettings::parse()` with arbitrary TOML and checks that
//! accepted settings survive a trip through host properties.

#![no_main]
use jstd_settings::SensorSettings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(settings) = SensorSettings::parse(s)
    {
        let _ = SensorSettings::from_properties(&settings.to_properties());
    }
});
