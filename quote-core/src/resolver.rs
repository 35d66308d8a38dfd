//! Fee schedule resolution: validated input → itemized quote.
//!
//! `resolve` is a total, deterministic, side-effect-free mapping from a
//! [`QuoteInput`] and a read-only [`FeeScheduleConfig`] to a
//! [`QuoteBreakdown`]. The line items are:
//!
//! | Item | Rule |
//! |------|------|
//! | Base | exact lookup per the configured base-fee rule |
//! | Schedule C | income-band fee when claimed, else 0 |
//! | Schedule D / E | flat constant when claimed, else 0 |
//! | K-1 forms | clamped per-unit billing or exact tier lookup |
//! | Jurisdictions | same machinery; linear rule sets include the first |
//! | Foreign income | advisory note only, never a numeric fee |
//!
//! Counts outside the configured per-unit range clamp to it, so a count at
//! or above the cap bills as exactly the cap (the "N+" sentinel at the
//! per-unit rate). A lookup against a value with no table entry is a
//! configuration defect, reported as a [`FeeScheduleError`] — never
//! silently defaulted, and disjoint from user validation failures.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use rust_decimal_macros::dec;
//! use quote_core::{
//!     resolve, BaseFeeRule, DeductionType, FactorPricing, FactorValue,
//!     FeeScheduleConfig, FilingStatus, ForeignIncomeHandling, QuoteInput,
//!     ScheduleCFees, ScheduleFees, ScheduleSelections,
//! };
//!
//! let config = FeeScheduleConfig {
//!     name: "schedule-linear".to_string(),
//!     filing_statuses: vec![FilingStatus::Single],
//!     base_fee: BaseFeeRule::ByFilingAndDeduction(HashMap::from([(
//!         FilingStatus::Single,
//!         HashMap::from([
//!             (DeductionType::Standard, dec!(300)),
//!             (DeductionType::Itemized, dec!(350)),
//!         ]),
//!     )])),
//!     schedules: Some(ScheduleFees {
//!         schedule_c: ScheduleCFees {
//!             under_250k: dec!(50),
//!             at_or_over_250k: dec!(100),
//!         },
//!         schedule_d: dec!(50),
//!         schedule_e: dec!(50),
//!     }),
//!     home_ownership_fee: None,
//!     k1_forms: FactorPricing::PerUnit {
//!         rate: dec!(100), included: 0, min: 0, max: 20,
//!     },
//!     jurisdictions: FactorPricing::PerUnit {
//!         rate: dec!(100), included: 1, min: 1, max: 10,
//!     },
//!     foreign_income: ForeignIncomeHandling::DeferToConsultation {
//!         note: "Discussed during consultation".to_string(),
//!     },
//! };
//!
//! let input = QuoteInput {
//!     client_name: "Ada Lovelace".to_string(),
//!     client_email: "ada@example.com".to_string(),
//!     filing_status: FilingStatus::Single,
//!     deduction_type: Some(DeductionType::Standard),
//!     schedules: Some(ScheduleSelections {
//!         schedule_c: None,
//!         schedule_d: true,
//!         schedule_e: false,
//!     }),
//!     owns_home: None,
//!     k1_forms: FactorValue::Count(3),
//!     jurisdictions: FactorValue::Count(2),
//!     has_foreign_income: false,
//! };
//!
//! let breakdown = resolve(&input, &config).unwrap();
//!
//! // 300 base + 50 schedule D + 3×100 K-1 + (2-1)×100 jurisdictions
//! assert_eq!(breakdown.total, dec!(750));
//! ```

use rust_decimal::Decimal;
use tracing::error;

use crate::models::{
    BaseFeeRule, FactorKind, FactorPricing, FactorValue, FeeScheduleConfig, FeeScheduleError,
    ForeignIncomeHandling, QuoteBreakdown, QuoteInput,
};

/// Computes the itemized quote for a validated input.
///
/// Total computation: every error this returns is a configuration or
/// programming defect (a validated value with no table entry, or an input
/// shaped for the other pricing variant), not a user input problem.
pub fn resolve(
    input: &QuoteInput,
    config: &FeeScheduleConfig,
) -> Result<QuoteBreakdown, FeeScheduleError> {
    let base = base_fee(input, config)?;
    let (schedule_c, schedule_d, schedule_e) = schedule_fees(input, config)?;
    let home_ownership = home_ownership_fee(input, config)?;
    let k1_forms = factor_fee(FactorKind::K1Forms, &input.k1_forms, &config.k1_forms)?;
    let jurisdictions = factor_fee(
        FactorKind::Jurisdictions,
        &input.jurisdictions,
        &config.jurisdictions,
    )?;

    let foreign_income_note = match (&config.foreign_income, input.has_foreign_income) {
        (ForeignIncomeHandling::DeferToConsultation { note }, true) => Some(note.clone()),
        _ => None,
    };

    let total =
        base + schedule_c + schedule_d + schedule_e + home_ownership + k1_forms + jurisdictions;

    Ok(QuoteBreakdown {
        base,
        schedule_c,
        schedule_d,
        schedule_e,
        home_ownership,
        k1_forms,
        jurisdictions,
        total,
        foreign_income_note,
    })
}

fn base_fee(input: &QuoteInput, config: &FeeScheduleConfig) -> Result<Decimal, FeeScheduleError> {
    match &config.base_fee {
        BaseFeeRule::Flat(fee) => Ok(*fee),
        BaseFeeRule::ByFilingStatus(table) => table.get(&input.filing_status).copied().ok_or_else(
            || {
                error!(
                    schedule = %config.name,
                    filing_status = %input.filing_status,
                    "base fee lookup miss"
                );
                FeeScheduleError::MissingBaseFee {
                    filing_status: input.filing_status,
                }
            },
        ),
        BaseFeeRule::ByFilingAndDeduction(table) => {
            let Some(deduction) = input.deduction_type else {
                return Err(FeeScheduleError::MissingDeductionSelection);
            };
            table
                .get(&input.filing_status)
                .and_then(|by_deduction| by_deduction.get(&deduction))
                .copied()
                .ok_or_else(|| {
                    error!(
                        schedule = %config.name,
                        filing_status = %input.filing_status,
                        deduction_type = %deduction,
                        "base fee lookup miss"
                    );
                    FeeScheduleError::MissingBaseFeeCell {
                        filing_status: input.filing_status,
                        deduction_type: deduction,
                    }
                })
        }
    }
}

fn schedule_fees(
    input: &QuoteInput,
    config: &FeeScheduleConfig,
) -> Result<(Decimal, Decimal, Decimal), FeeScheduleError> {
    let Some(fees) = &config.schedules else {
        return Ok((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
    };
    let Some(selections) = &input.schedules else {
        return Err(FeeScheduleError::MissingScheduleSelections);
    };

    let schedule_c = selections
        .schedule_c
        .map(|band| fees.schedule_c.fee_for(band))
        .unwrap_or(Decimal::ZERO);
    let schedule_d = if selections.schedule_d {
        fees.schedule_d
    } else {
        Decimal::ZERO
    };
    let schedule_e = if selections.schedule_e {
        fees.schedule_e
    } else {
        Decimal::ZERO
    };

    Ok((schedule_c, schedule_d, schedule_e))
}

fn home_ownership_fee(
    input: &QuoteInput,
    config: &FeeScheduleConfig,
) -> Result<Decimal, FeeScheduleError> {
    let Some(fee) = config.home_ownership_fee else {
        return Ok(Decimal::ZERO);
    };
    match input.owns_home {
        Some(true) => Ok(fee),
        Some(false) => Ok(Decimal::ZERO),
        None => Err(FeeScheduleError::MissingHomeOwnershipSelection),
    }
}

fn factor_fee(
    factor: FactorKind,
    value: &FactorValue,
    pricing: &FactorPricing,
) -> Result<Decimal, FeeScheduleError> {
    match (value, pricing) {
        (
            FactorValue::Count(count),
            FactorPricing::PerUnit {
                rate,
                included,
                min,
                max,
            },
        ) => {
            // Clamp before billing: a count above the cap is the "N+"
            // sentinel, billed as exactly the cap.
            let clamped = (*count).max(*min).min(*max);
            let billable = clamped.saturating_sub(*included);
            Ok(Decimal::from(billable) * *rate)
        }
        (FactorValue::Band(label), FactorPricing::Banded(tiers)) => tiers
            .iter()
            .find(|tier| tier.label == *label)
            .map(|tier| tier.fee)
            .ok_or_else(|| {
                error!(%factor, %label, "tier fee lookup miss");
                FeeScheduleError::UnknownBand {
                    factor,
                    label: label.clone(),
                }
            }),
        (FactorValue::Band(_), FactorPricing::PerUnit { .. }) => {
            Err(FeeScheduleError::RepresentationMismatch {
                factor,
                given: "tier selection",
                expected: "count",
            })
        }
        (FactorValue::Count(_), FactorPricing::Banded(_)) => {
            Err(FeeScheduleError::RepresentationMismatch {
                factor,
                given: "count",
                expected: "tier",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        BandFee, DeductionType, FilingStatus, ScheduleCFees, ScheduleCIncomeBand, ScheduleFees,
        ScheduleSelections,
    };

    fn linear_config() -> FeeScheduleConfig {
        FeeScheduleConfig {
            name: "linear".to_string(),
            filing_statuses: vec![
                FilingStatus::Single,
                FilingStatus::MarriedFilingSeparately,
                FilingStatus::MarriedFilingJointly,
            ],
            base_fee: BaseFeeRule::ByFilingAndDeduction(HashMap::from([
                (
                    FilingStatus::Single,
                    HashMap::from([
                        (DeductionType::Standard, dec!(300)),
                        (DeductionType::Itemized, dec!(350)),
                    ]),
                ),
                (
                    FilingStatus::MarriedFilingJointly,
                    HashMap::from([
                        (DeductionType::Standard, dec!(350)),
                        (DeductionType::Itemized, dec!(400)),
                    ]),
                ),
            ])),
            schedules: Some(ScheduleFees {
                schedule_c: ScheduleCFees {
                    under_250k: dec!(50),
                    at_or_over_250k: dec!(100),
                },
                schedule_d: dec!(50),
                schedule_e: dec!(50),
            }),
            home_ownership_fee: None,
            k1_forms: FactorPricing::PerUnit {
                rate: dec!(100),
                included: 0,
                min: 0,
                max: 20,
            },
            jurisdictions: FactorPricing::PerUnit {
                rate: dec!(100),
                included: 1,
                min: 1,
                max: 10,
            },
            foreign_income: ForeignIncomeHandling::DeferToConsultation {
                note: "Discussed during consultation".to_string(),
            },
        }
    }

    fn banded_config() -> FeeScheduleConfig {
        FeeScheduleConfig {
            name: "banded".to_string(),
            filing_statuses: vec![FilingStatus::Single, FilingStatus::HeadOfHousehold],
            base_fee: BaseFeeRule::ByFilingStatus(HashMap::from([
                (FilingStatus::Single, dec!(350)),
                (FilingStatus::HeadOfHousehold, dec!(375)),
            ])),
            schedules: None,
            home_ownership_fee: Some(dec!(150)),
            k1_forms: FactorPricing::Banded(vec![
                BandFee {
                    label: "0".to_string(),
                    fee: dec!(0),
                },
                BandFee {
                    label: "1".to_string(),
                    fee: dec!(200),
                },
                BandFee {
                    label: "2-5".to_string(),
                    fee: dec!(600),
                },
                BandFee {
                    label: "6-14".to_string(),
                    fee: dec!(1200),
                },
                BandFee {
                    label: "15+".to_string(),
                    fee: dec!(2000),
                },
            ]),
            jurisdictions: FactorPricing::Banded(vec![
                BandFee {
                    label: "1".to_string(),
                    fee: dec!(250),
                },
                BandFee {
                    label: "2-5".to_string(),
                    fee: dec!(500),
                },
                BandFee {
                    label: "6-14".to_string(),
                    fee: dec!(900),
                },
                BandFee {
                    label: "15+".to_string(),
                    fee: dec!(1500),
                },
            ]),
            foreign_income: ForeignIncomeHandling::DeferToConsultation {
                note: "Discussed during consultation".to_string(),
            },
        }
    }

    fn linear_input() -> QuoteInput {
        QuoteInput {
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            filing_status: FilingStatus::Single,
            deduction_type: Some(DeductionType::Standard),
            schedules: Some(ScheduleSelections {
                schedule_c: None,
                schedule_d: true,
                schedule_e: false,
            }),
            owns_home: None,
            k1_forms: FactorValue::Count(3),
            jurisdictions: FactorValue::Count(2),
            has_foreign_income: false,
        }
    }

    fn banded_input() -> QuoteInput {
        QuoteInput {
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            filing_status: FilingStatus::Single,
            deduction_type: None,
            schedules: None,
            owns_home: Some(true),
            k1_forms: FactorValue::Band("2-5".to_string()),
            jurisdictions: FactorValue::Band("1".to_string()),
            has_foreign_income: false,
        }
    }

    // =========================================================================
    // worked examples
    // =========================================================================

    #[test]
    fn resolve_prices_the_linear_example() {
        let breakdown = resolve(&linear_input(), &linear_config()).unwrap();

        assert_eq!(breakdown.base, dec!(300));
        assert_eq!(breakdown.schedule_c, dec!(0));
        assert_eq!(breakdown.schedule_d, dec!(50));
        assert_eq!(breakdown.schedule_e, dec!(0));
        assert_eq!(breakdown.k1_forms, dec!(300)); // 3 × 100
        assert_eq!(breakdown.jurisdictions, dec!(100)); // (2 - 1) × 100
        assert_eq!(breakdown.total, dec!(750));
        assert_eq!(breakdown.foreign_income_note, None);
    }

    #[test]
    fn resolve_prices_the_banded_example() {
        let breakdown = resolve(&banded_input(), &banded_config()).unwrap();

        assert_eq!(breakdown.base, dec!(350));
        assert_eq!(breakdown.home_ownership, dec!(150));
        assert_eq!(breakdown.k1_forms, dec!(600));
        assert_eq!(breakdown.jurisdictions, dec!(250));
        assert_eq!(breakdown.total, dec!(1350));
    }

    #[test]
    fn resolve_is_deterministic() {
        let first = resolve(&banded_input(), &banded_config()).unwrap();
        let second = resolve(&banded_input(), &banded_config()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn total_equals_exact_sum_of_line_items() {
        let input = QuoteInput {
            schedules: Some(ScheduleSelections {
                schedule_c: Some(ScheduleCIncomeBand::AtOrOver250k),
                schedule_d: true,
                schedule_e: true,
            }),
            k1_forms: FactorValue::Count(7),
            jurisdictions: FactorValue::Count(4),
            ..linear_input()
        };

        let breakdown = resolve(&input, &linear_config()).unwrap();

        let sum = breakdown.base
            + breakdown.schedule_c
            + breakdown.schedule_d
            + breakdown.schedule_e
            + breakdown.home_ownership
            + breakdown.k1_forms
            + breakdown.jurisdictions;
        assert_eq!(breakdown.total, sum);
    }

    // =========================================================================
    // base fee
    // =========================================================================

    #[test]
    fn base_fee_uses_deduction_axis() {
        let input = QuoteInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            deduction_type: Some(DeductionType::Itemized),
            ..linear_input()
        };

        let breakdown = resolve(&input, &linear_config()).unwrap();

        assert_eq!(breakdown.base, dec!(400));
    }

    #[test]
    fn base_fee_flat_ignores_status() {
        let config = FeeScheduleConfig {
            base_fee: BaseFeeRule::Flat(dec!(400)),
            ..banded_config()
        };
        let input = QuoteInput {
            filing_status: FilingStatus::HeadOfHousehold,
            ..banded_input()
        };

        let breakdown = resolve(&input, &config).unwrap();

        assert_eq!(breakdown.base, dec!(400));
    }

    #[test]
    fn base_fee_lookup_miss_is_fatal_not_zero() {
        // MarriedFilingSeparately is offered but its table row is absent:
        // a configuration defect that must fail loudly.
        let input = QuoteInput {
            filing_status: FilingStatus::MarriedFilingSeparately,
            ..linear_input()
        };

        let result = resolve(&input, &linear_config());

        assert_eq!(
            result,
            Err(FeeScheduleError::MissingBaseFeeCell {
                filing_status: FilingStatus::MarriedFilingSeparately,
                deduction_type: DeductionType::Standard,
            })
        );
    }

    #[test]
    fn base_fee_without_deduction_selection_is_internal_error() {
        let input = QuoteInput {
            deduction_type: None,
            ..linear_input()
        };

        let result = resolve(&input, &linear_config());

        assert_eq!(result, Err(FeeScheduleError::MissingDeductionSelection));
    }

    // =========================================================================
    // schedule and home fees
    // =========================================================================

    #[test]
    fn schedule_c_fee_follows_income_band() {
        let config = linear_config();
        let under = QuoteInput {
            schedules: Some(ScheduleSelections {
                schedule_c: Some(ScheduleCIncomeBand::Under250k),
                schedule_d: false,
                schedule_e: false,
            }),
            ..linear_input()
        };
        let over = QuoteInput {
            schedules: Some(ScheduleSelections {
                schedule_c: Some(ScheduleCIncomeBand::AtOrOver250k),
                schedule_d: false,
                schedule_e: false,
            }),
            ..linear_input()
        };

        assert_eq!(resolve(&under, &config).unwrap().schedule_c, dec!(50));
        assert_eq!(resolve(&over, &config).unwrap().schedule_c, dec!(100));
    }

    #[test]
    fn unclaimed_schedules_charge_nothing() {
        let input = QuoteInput {
            schedules: Some(ScheduleSelections {
                schedule_c: None,
                schedule_d: false,
                schedule_e: false,
            }),
            ..linear_input()
        };

        let breakdown = resolve(&input, &linear_config()).unwrap();

        assert_eq!(breakdown.schedule_c, dec!(0));
        assert_eq!(breakdown.schedule_d, dec!(0));
        assert_eq!(breakdown.schedule_e, dec!(0));
    }

    #[test]
    fn home_ownership_fee_applies_only_to_owners() {
        let config = banded_config();
        let renter = QuoteInput {
            owns_home: Some(false),
            ..banded_input()
        };

        assert_eq!(
            resolve(&banded_input(), &config).unwrap().home_ownership,
            dec!(150)
        );
        assert_eq!(resolve(&renter, &config).unwrap().home_ownership, dec!(0));
    }

    // =========================================================================
    // factor fees: clamping and monotonicity
    // =========================================================================

    #[test]
    fn per_unit_count_at_cap_and_above_bill_the_same() {
        let config = linear_config();
        let at_cap = QuoteInput {
            k1_forms: FactorValue::Count(20),
            ..linear_input()
        };
        let above_cap = QuoteInput {
            k1_forms: FactorValue::Count(57),
            ..linear_input()
        };

        let capped = resolve(&at_cap, &config).unwrap().k1_forms;

        assert_eq!(capped, dec!(2000));
        assert_eq!(resolve(&above_cap, &config).unwrap().k1_forms, capped);
    }

    #[test]
    fn per_unit_count_below_min_clamps_up() {
        let config = linear_config();
        let input = QuoteInput {
            jurisdictions: FactorValue::Count(0),
            ..linear_input()
        };

        // Clamped to min 1, then the included jurisdiction makes it free.
        assert_eq!(resolve(&input, &config).unwrap().jurisdictions, dec!(0));
    }

    #[test]
    fn first_jurisdiction_is_included_in_linear_pricing() {
        let config = linear_config();
        let single_state = QuoteInput {
            jurisdictions: FactorValue::Count(1),
            ..linear_input()
        };

        assert_eq!(
            resolve(&single_state, &config).unwrap().jurisdictions,
            dec!(0)
        );
    }

    #[test]
    fn per_unit_fee_is_monotone_in_count() {
        let config = linear_config();

        let mut previous = Decimal::MIN;
        for count in 0..=25 {
            let input = QuoteInput {
                k1_forms: FactorValue::Count(count),
                ..linear_input()
            };
            let fee = resolve(&input, &config).unwrap().k1_forms;
            assert!(fee >= previous, "fee decreased at count {count}");
            previous = fee;
        }
    }

    #[test]
    fn banded_fee_is_monotone_in_tier_order() {
        let config = banded_config();

        let mut previous = Decimal::MIN;
        for label in ["0", "1", "2-5", "6-14", "15+"] {
            let input = QuoteInput {
                k1_forms: FactorValue::Band(label.to_string()),
                ..banded_input()
            };
            let fee = resolve(&input, &config).unwrap().k1_forms;
            assert!(fee >= previous, "fee decreased at tier {label}");
            previous = fee;
        }
    }

    #[test]
    fn unknown_band_is_fatal() {
        let input = QuoteInput {
            jurisdictions: FactorValue::Band("50+".to_string()),
            ..banded_input()
        };

        let result = resolve(&input, &banded_config());

        assert_eq!(
            result,
            Err(FeeScheduleError::UnknownBand {
                factor: FactorKind::Jurisdictions,
                label: "50+".to_string(),
            })
        );
    }

    #[test]
    fn representation_mismatch_is_fatal() {
        let input = QuoteInput {
            k1_forms: FactorValue::Count(3),
            ..banded_input()
        };

        let result = resolve(&input, &banded_config());

        assert_eq!(
            result,
            Err(FeeScheduleError::RepresentationMismatch {
                factor: FactorKind::K1Forms,
                given: "count",
                expected: "tier",
            })
        );
    }

    // =========================================================================
    // foreign income
    // =========================================================================

    #[test]
    fn foreign_income_adds_note_but_no_fee() {
        let input = QuoteInput {
            has_foreign_income: true,
            ..linear_input()
        };

        let with_foreign = resolve(&input, &linear_config()).unwrap();
        let without = resolve(&linear_input(), &linear_config()).unwrap();

        assert_eq!(
            with_foreign.foreign_income_note.as_deref(),
            Some("Discussed during consultation")
        );
        assert_eq!(with_foreign.total, without.total);
    }

    #[test]
    fn foreign_income_is_silent_when_not_applicable() {
        let config = FeeScheduleConfig {
            foreign_income: ForeignIncomeHandling::NotApplicable,
            ..banded_config()
        };
        let input = QuoteInput {
            has_foreign_income: true,
            ..banded_input()
        };

        let breakdown = resolve(&input, &config).unwrap();

        assert_eq!(breakdown.foreign_income_note, None);
        assert_eq!(breakdown.total, dec!(1350));
    }
}
