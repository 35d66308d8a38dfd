use std::fs;
use std::path::Path;

use quote_core::{FeeScheduleConfig, FeeScheduleError};
use thiserror::Error;

use crate::rulesets;

/// Errors that can occur when loading a fee schedule rule set.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("failed to read rule set file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("incomplete fee schedule: {0}")]
    Incomplete(#[from] FeeScheduleError),

    #[error("no built-in rule set named '{0}'")]
    UnknownBuiltin(String),
}

/// Loader for fee schedule rule sets.
///
/// A rule set is a TOML document with the [`FeeScheduleConfig`] schema.
/// Every load path runs [`FeeScheduleConfig::validate`] so that a schedule
/// with an undefined table cell never reaches the resolver; load it once at
/// startup and treat the result as read-only.
pub struct RuleSetLoader;

impl RuleSetLoader {
    /// Parse and validate a rule set from a TOML document.
    pub fn parse(document: &str) -> Result<FeeScheduleConfig, RuleSetError> {
        let config: FeeScheduleConfig = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a rule set file.
    pub fn load(path: &Path) -> Result<FeeScheduleConfig, RuleSetError> {
        let document = fs::read_to_string(path)?;
        Self::parse(&document)
    }

    /// Parse one of the bundled rule sets by name (see [`rulesets::NAMES`]).
    pub fn builtin(name: &str) -> Result<FeeScheduleConfig, RuleSetError> {
        let document = rulesets::document(name)
            .ok_or_else(|| RuleSetError::UnknownBuiltin(name.to_string()))?;
        Self::parse(document)
    }
}
