use std::collections::{HashMap, HashSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DeductionType, FilingStatus, ScheduleCIncomeBand};

/// Errors raised by fee-schedule validation and resolution.
///
/// These are configuration or programming defects, disjoint from user input
/// errors: the engine fails loudly rather than substitute a default fee,
/// since a silent zero would misprice a quote without detection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeScheduleError {
    #[error("fee schedule '{0}' offers no filing statuses")]
    NoFilingStatuses(String),

    #[error("no base fee configured for {filing_status}")]
    MissingBaseFee { filing_status: FilingStatus },

    #[error("no base fee configured for {filing_status} + {deduction_type}")]
    MissingBaseFeeCell {
        filing_status: FilingStatus,
        deduction_type: DeductionType,
    },

    #[error("negative fee {fee} configured for {item}")]
    NegativeFee { item: String, fee: Decimal },

    #[error("{factor} tier table is empty")]
    EmptyBandTable { factor: FactorKind },

    #[error("{factor} tier '{label}' is configured twice")]
    DuplicateBandLabel { factor: FactorKind, label: String },

    #[error("{factor} per-unit range is inverted (min {min} > max {max})")]
    InvertedUnitRange { factor: FactorKind, min: u32, max: u32 },

    #[error("{factor} includes {included} units but caps at {max}")]
    IncludedExceedsMax {
        factor: FactorKind,
        included: u32,
        max: u32,
    },

    #[error("foreign income defers to consultation but the advisory note is empty")]
    EmptyConsultationNote,

    #[error("no fee configured for {factor} tier '{label}'")]
    UnknownBand { factor: FactorKind, label: String },

    #[error("{factor} was given as a {given}, but this fee schedule prices {factor} by {expected}")]
    RepresentationMismatch {
        factor: FactorKind,
        given: &'static str,
        expected: &'static str,
    },

    #[error("input carries no deduction type but the base-fee table has a deduction axis")]
    MissingDeductionSelection,

    #[error("input carries no schedule selections but the fee schedule prices schedules")]
    MissingScheduleSelections,

    #[error("input carries no home-ownership answer but the fee schedule prices home ownership")]
    MissingHomeOwnershipSelection,
}

/// The two count-based complexity factors a fee schedule prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorKind {
    K1Forms,
    Jurisdictions,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::K1Forms => "K-1 forms",
            Self::Jurisdictions => "filing jurisdictions",
        })
    }
}

/// How the base fee is determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseFeeRule {
    /// Exact-match lookup on (filing status, deduction type).
    ByFilingAndDeduction(HashMap<FilingStatus, HashMap<DeductionType, Decimal>>),
    /// Exact-match lookup on filing status alone.
    ByFilingStatus(HashMap<FilingStatus, Decimal>),
    /// One fixed amount regardless of status.
    Flat(Decimal),
}

/// One tier of a banded factor table, e.g. `"2-5"` at a fixed fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandFee {
    pub label: String,
    pub fee: Decimal,
}

/// Pricing for one count-based factor. A rule set picks exactly one shape
/// per factor; the two are never mixed within one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorPricing {
    /// Linear pricing: the count is clamped to `[min, max]`, `included`
    /// units are free, and each remaining unit bills at `rate`. A count at
    /// or above `max` bills as exactly `max` (the "N+" sentinel).
    PerUnit {
        rate: Decimal,
        #[serde(default)]
        included: u32,
        #[serde(default)]
        min: u32,
        max: u32,
    },
    /// Ordered tier table: the selected label maps to a fixed fee.
    Banded(Vec<BandFee>),
}

/// Schedule C fees by income band. One field per band, so every band the
/// input enum can take has a fee by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCFees {
    pub under_250k: Decimal,
    pub at_or_over_250k: Decimal,
}

impl ScheduleCFees {
    pub fn fee_for(&self, band: ScheduleCIncomeBand) -> Decimal {
        match band {
            ScheduleCIncomeBand::Under250k => self.under_250k,
            ScheduleCIncomeBand::AtOrOver250k => self.at_or_over_250k,
        }
    }
}

/// Supplementary-schedule fees, present only in rule sets that price them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFees {
    pub schedule_c: ScheduleCFees,
    pub schedule_d: Decimal,
    pub schedule_e: Decimal,
}

/// What a foreign-income flag does to the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum ForeignIncomeHandling {
    /// The rule set does not treat foreign income specially.
    NotApplicable,
    /// No numeric fee; the breakdown carries `note` as an advisory line.
    DeferToConsultation { note: String },
}

/// A complete, declarative fee schedule for one deployed pricing variant.
///
/// Loaded once at startup and read-only for the lifetime of the process.
/// The resolver is a pure function over a `QuoteInput` and this table set,
/// so concurrent quote computations need no locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleConfig {
    /// Rule-set identifier, used in logs and rendered output.
    pub name: String,
    /// Filing statuses this rule set offers; validation rejects the rest.
    pub filing_statuses: Vec<FilingStatus>,
    pub base_fee: BaseFeeRule,
    #[serde(default)]
    pub schedules: Option<ScheduleFees>,
    #[serde(default)]
    pub home_ownership_fee: Option<Decimal>,
    pub k1_forms: FactorPricing,
    pub jurisdictions: FactorPricing,
    pub foreign_income: ForeignIncomeHandling,
}

impl FeeScheduleConfig {
    /// Whether the base-fee table has a deduction axis. Drives which input
    /// fields validation requires.
    pub fn has_deduction_axis(&self) -> bool {
        matches!(self.base_fee, BaseFeeRule::ByFilingAndDeduction(_))
    }

    pub fn prices_schedules(&self) -> bool {
        self.schedules.is_some()
    }

    pub fn prices_home_ownership(&self) -> bool {
        self.home_ownership_fee.is_some()
    }

    /// Checks the schedule is complete: every value a validated input can
    /// carry must resolve to a defined fee, and no fee may be negative.
    ///
    /// Run once at load time; resolution assumes it has passed and treats
    /// any remaining lookup miss as a defect.
    pub fn validate(&self) -> Result<(), FeeScheduleError> {
        if self.filing_statuses.is_empty() {
            return Err(FeeScheduleError::NoFilingStatuses(self.name.clone()));
        }

        self.validate_base_fee()?;

        if let Some(fees) = &self.schedules {
            for (item, fee) in [
                ("schedule C under $250k", fees.schedule_c.under_250k),
                ("schedule C at/over $250k", fees.schedule_c.at_or_over_250k),
                ("schedule D", fees.schedule_d),
                ("schedule E", fees.schedule_e),
            ] {
                check_non_negative(item, fee)?;
            }
        }

        if let Some(fee) = self.home_ownership_fee {
            check_non_negative("home ownership", fee)?;
        }

        validate_factor_pricing(FactorKind::K1Forms, &self.k1_forms)?;
        validate_factor_pricing(FactorKind::Jurisdictions, &self.jurisdictions)?;

        if let ForeignIncomeHandling::DeferToConsultation { note } = &self.foreign_income {
            if note.trim().is_empty() {
                return Err(FeeScheduleError::EmptyConsultationNote);
            }
        }

        Ok(())
    }

    fn validate_base_fee(&self) -> Result<(), FeeScheduleError> {
        match &self.base_fee {
            BaseFeeRule::Flat(fee) => check_non_negative("flat base", *fee),
            BaseFeeRule::ByFilingStatus(table) => {
                for status in &self.filing_statuses {
                    let fee = table
                        .get(status)
                        .copied()
                        .ok_or(FeeScheduleError::MissingBaseFee {
                            filing_status: *status,
                        })?;
                    check_non_negative(&format!("base for {status}"), fee)?;
                }
                Ok(())
            }
            BaseFeeRule::ByFilingAndDeduction(table) => {
                for status in &self.filing_statuses {
                    let by_deduction =
                        table.get(status).ok_or(FeeScheduleError::MissingBaseFee {
                            filing_status: *status,
                        })?;
                    for deduction in [DeductionType::Standard, DeductionType::Itemized] {
                        let fee = by_deduction.get(&deduction).copied().ok_or(
                            FeeScheduleError::MissingBaseFeeCell {
                                filing_status: *status,
                                deduction_type: deduction,
                            },
                        )?;
                        check_non_negative(&format!("base for {status} + {deduction}"), fee)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_non_negative(item: &str, fee: Decimal) -> Result<(), FeeScheduleError> {
    if fee < Decimal::ZERO {
        return Err(FeeScheduleError::NegativeFee {
            item: item.to_string(),
            fee,
        });
    }
    Ok(())
}

fn validate_factor_pricing(
    factor: FactorKind,
    pricing: &FactorPricing,
) -> Result<(), FeeScheduleError> {
    match pricing {
        FactorPricing::PerUnit {
            rate,
            included,
            min,
            max,
        } => {
            check_non_negative(&format!("{factor} per-unit rate"), *rate)?;
            if min > max {
                return Err(FeeScheduleError::InvertedUnitRange {
                    factor,
                    min: *min,
                    max: *max,
                });
            }
            if included > max {
                return Err(FeeScheduleError::IncludedExceedsMax {
                    factor,
                    included: *included,
                    max: *max,
                });
            }
            Ok(())
        }
        FactorPricing::Banded(tiers) => {
            if tiers.is_empty() {
                return Err(FeeScheduleError::EmptyBandTable { factor });
            }
            let mut seen = HashSet::new();
            for tier in tiers {
                if !seen.insert(tier.label.as_str()) {
                    return Err(FeeScheduleError::DuplicateBandLabel {
                        factor,
                        label: tier.label.clone(),
                    });
                }
                check_non_negative(&format!("{factor} tier '{}'", tier.label), tier.fee)?;
            }
            Ok(())
        }
    }
}
