use serde::{Deserialize, Serialize};

use super::{DeductionType, FilingStatus, ScheduleCIncomeBand};

/// One count-based complexity factor as entered by the client.
///
/// A rule set prices each factor either per unit or through a fixed tier
/// table, never both, so a request must supply the matching shape: a plain
/// count for per-unit pricing, a tier label (e.g. `"2-5"`) for banded
/// pricing. Validation rejects the other shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Count(u32),
    Band(String),
}

/// A raw, form-shaped quote request as received from the caller.
///
/// Selections the client has not answered are `None`; `validate` decides
/// which of them the loaded fee schedule actually requires. Never fed to
/// the resolver directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequest {
    pub client_name: String,
    pub client_email: String,
    pub filing_status: Option<FilingStatus>,
    pub deduction_type: Option<DeductionType>,
    pub has_schedule_c: Option<bool>,
    pub schedule_c_income_band: Option<ScheduleCIncomeBand>,
    pub has_schedule_d: Option<bool>,
    pub has_schedule_e: Option<bool>,
    pub owns_home: Option<bool>,
    pub k1_forms: Option<FactorValue>,
    pub jurisdictions: Option<FactorValue>,
    pub has_foreign_income: Option<bool>,
}
