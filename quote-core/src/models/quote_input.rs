use serde::{Deserialize, Serialize};

use super::{DeductionType, FactorValue, FilingStatus, ScheduleCIncomeBand};

/// A validated quote input, produced by `validation::validate`.
///
/// The optional fields mirror the loaded fee schedule: `deduction_type` is
/// `Some` exactly when the base-fee table has a deduction axis, `schedules`
/// when schedule fees are configured, `owns_home` when home ownership is
/// priced. Immutable once built; construct a fresh one per computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub client_name: String,
    pub client_email: String,
    pub filing_status: FilingStatus,
    pub deduction_type: Option<DeductionType>,
    pub schedules: Option<ScheduleSelections>,
    pub owns_home: Option<bool>,
    pub k1_forms: FactorValue,
    pub jurisdictions: FactorValue,
    pub has_foreign_income: bool,
}

/// Supplementary-schedule answers for rule sets that price schedules.
///
/// `schedule_c` is `Some` with the client's income band when Schedule C
/// applies, `None` when it does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSelections {
    pub schedule_c: Option<ScheduleCIncomeBand>,
    pub schedule_d: bool,
    pub schedule_e: bool,
}
