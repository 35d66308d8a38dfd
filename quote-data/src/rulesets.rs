//! The shipped rule sets, one per observed pricing variant.
//!
//! Bundled via `include_str!` so tests and binaries need no filesystem
//! layout; parse them with [`crate::RuleSetLoader::builtin`].

/// Continuous-count variant: base by filing status and deduction type,
/// schedule fees, per-unit K-1 and jurisdiction pricing.
pub const SCHEDULE_LINEAR: &str = include_str!("../rulesets/schedule-linear.toml");

/// Banded variant with a home-ownership fee and base by filing status.
pub const HOMEOWNER_BANDED: &str = include_str!("../rulesets/homeowner-banded.toml");

/// Banded variant with one flat base fee and no foreign-income handling.
pub const FLAT_BANDED: &str = include_str!("../rulesets/flat-banded.toml");

pub const NAMES: [&str; 3] = ["schedule-linear", "homeowner-banded", "flat-banded"];

/// The bundled TOML document for `name`, if there is one.
pub fn document(name: &str) -> Option<&'static str> {
    match name {
        "schedule-linear" => Some(SCHEDULE_LINEAR),
        "homeowner-banded" => Some(HOMEOWNER_BANDED),
        "flat-banded" => Some(FLAT_BANDED),
        _ => None,
    }
}
