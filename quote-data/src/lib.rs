pub mod loader;
pub mod rulesets;

pub use loader::{RuleSetError, RuleSetLoader};
