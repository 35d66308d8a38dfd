//! Input validation for quote requests.
//!
//! `validate` gates every computation: the resolver only ever sees a
//! [`QuoteInput`] this module produced. All rules are checked and all
//! violations returned together, so a caller can surface the complete
//! field list in one round trip. Validation performs no I/O and has no
//! side effects beyond its verdict.
//!
//! Which fields are required depends on the loaded fee schedule: a rule
//! set with a deduction axis requires a deduction type, one that prices
//! home ownership requires the ownership answer, and so on. The email
//! check is the deliberately simple `local@domain.tld` shape (a single
//! at-sign, at least one dot after it, no whitespace), not RFC 5322.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{
    FactorKind, FactorPricing, FactorValue, FeeScheduleConfig, FilingStatus, QuoteInput,
    QuoteRequest, ScheduleSelections,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A violated validation rule. `field` names the offending input field so
/// callers can re-prompt precisely.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("client name must not be empty")]
    EmptyClientName,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("filing status is required")]
    MissingFilingStatus,

    #[error("filing status {0} is not offered by this fee schedule")]
    UnsupportedFilingStatus(FilingStatus),

    #[error("deduction type is required")]
    MissingDeductionType,

    #[error("home-ownership answer is required")]
    MissingHomeOwnership,

    #[error("Schedule C answer is required")]
    MissingScheduleC,

    #[error("business income level is required when Schedule C applies")]
    MissingScheduleCIncomeBand,

    #[error("Schedule D answer is required")]
    MissingScheduleD,

    #[error("Schedule E answer is required")]
    MissingScheduleE,

    #[error("{0} selection is required")]
    MissingFactor(FactorKind),

    #[error("'{label}' is not a configured {factor} tier")]
    UnknownBandLabel { factor: FactorKind, label: String },

    #[error("{factor} must be given as {expected}")]
    WrongFactorShape {
        factor: FactorKind,
        expected: &'static str,
    },

    #[error("foreign income answer is required")]
    MissingForeignIncome,
}

impl ValidationError {
    /// Identifier of the violated field, matching [`QuoteRequest`] field
    /// names.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyClientName => "client_name",
            Self::InvalidEmail(_) => "client_email",
            Self::MissingFilingStatus | Self::UnsupportedFilingStatus(_) => "filing_status",
            Self::MissingDeductionType => "deduction_type",
            Self::MissingHomeOwnership => "owns_home",
            Self::MissingScheduleC => "has_schedule_c",
            Self::MissingScheduleCIncomeBand => "schedule_c_income_band",
            Self::MissingScheduleD => "has_schedule_d",
            Self::MissingScheduleE => "has_schedule_e",
            Self::MissingFactor(factor)
            | Self::UnknownBandLabel { factor, .. }
            | Self::WrongFactorShape { factor, .. } => match factor {
                FactorKind::K1Forms => "k1_forms",
                FactorKind::Jurisdictions => "jurisdictions",
            },
            Self::MissingForeignIncome => "has_foreign_income",
        }
    }
}

/// Validates a raw request against the loaded fee schedule.
///
/// Returns a fully valid [`QuoteInput`] or the non-empty list of violated
/// rules; there is no partial success, and callers must not attempt
/// resolution on a failed result.
///
/// # Example
///
/// ```
/// use quote_core::{validate, QuoteRequest, ValidationError};
/// # use std::collections::HashMap;
/// # use rust_decimal::Decimal;
/// # use quote_core::{
/// #     BaseFeeRule, FactorPricing, FeeScheduleConfig, FilingStatus,
/// #     ForeignIncomeHandling,
/// # };
/// # let config = FeeScheduleConfig {
/// #     name: "example".to_string(),
/// #     filing_statuses: vec![FilingStatus::Single],
/// #     base_fee: BaseFeeRule::Flat(Decimal::from(400)),
/// #     schedules: None,
/// #     home_ownership_fee: None,
/// #     k1_forms: FactorPricing::PerUnit {
/// #         rate: Decimal::from(100), included: 0, min: 0, max: 20,
/// #     },
/// #     jurisdictions: FactorPricing::PerUnit {
/// #         rate: Decimal::from(100), included: 1, min: 1, max: 10,
/// #     },
/// #     foreign_income: ForeignIncomeHandling::NotApplicable,
/// # };
/// let request = QuoteRequest {
///     client_name: "  ".to_string(),
///     client_email: "bob@x".to_string(),
///     ..QuoteRequest::default()
/// };
///
/// let errors = validate(&request, &config).unwrap_err();
///
/// assert!(errors.contains(&ValidationError::EmptyClientName));
/// assert!(errors.iter().any(|e| e.field() == "client_email"));
/// ```
pub fn validate(
    request: &QuoteRequest,
    config: &FeeScheduleConfig,
) -> Result<QuoteInput, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let client_name = request.client_name.trim();
    if client_name.is_empty() {
        errors.push(ValidationError::EmptyClientName);
    }

    let client_email = request.client_email.trim();
    if !EMAIL_RE.is_match(client_email) {
        errors.push(ValidationError::InvalidEmail(request.client_email.clone()));
    }

    let filing_status = match request.filing_status {
        None => {
            errors.push(ValidationError::MissingFilingStatus);
            None
        }
        Some(status) if !config.filing_statuses.contains(&status) => {
            errors.push(ValidationError::UnsupportedFilingStatus(status));
            None
        }
        Some(status) => Some(status),
    };

    let deduction_type = if config.has_deduction_axis() {
        if request.deduction_type.is_none() {
            errors.push(ValidationError::MissingDeductionType);
        }
        request.deduction_type
    } else {
        None
    };

    let owns_home = if config.prices_home_ownership() {
        if request.owns_home.is_none() {
            errors.push(ValidationError::MissingHomeOwnership);
        }
        request.owns_home
    } else {
        None
    };

    let schedules = if config.prices_schedules() {
        Some(validate_schedules(request, &mut errors))
    } else {
        None
    };

    let k1_forms = validate_factor(
        request.k1_forms.as_ref(),
        FactorKind::K1Forms,
        &config.k1_forms,
        &mut errors,
    );
    let jurisdictions = validate_factor(
        request.jurisdictions.as_ref(),
        FactorKind::Jurisdictions,
        &config.jurisdictions,
        &mut errors,
    );

    let has_foreign_income = match request.has_foreign_income {
        None => {
            errors.push(ValidationError::MissingForeignIncome);
            false
        }
        Some(answer) => answer,
    };

    if let (true, Some(filing_status), Some(k1_forms), Some(jurisdictions)) =
        (errors.is_empty(), filing_status, k1_forms, jurisdictions)
    {
        return Ok(QuoteInput {
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            filing_status,
            deduction_type,
            schedules,
            owns_home,
            k1_forms,
            jurisdictions,
            has_foreign_income,
        });
    }
    Err(errors)
}

fn validate_schedules(
    request: &QuoteRequest,
    errors: &mut Vec<ValidationError>,
) -> ScheduleSelections {
    let schedule_c = match request.has_schedule_c {
        None => {
            errors.push(ValidationError::MissingScheduleC);
            None
        }
        Some(false) => None,
        Some(true) => {
            if request.schedule_c_income_band.is_none() {
                errors.push(ValidationError::MissingScheduleCIncomeBand);
            }
            request.schedule_c_income_band
        }
    };

    let schedule_d = match request.has_schedule_d {
        None => {
            errors.push(ValidationError::MissingScheduleD);
            false
        }
        Some(answer) => answer,
    };

    let schedule_e = match request.has_schedule_e {
        None => {
            errors.push(ValidationError::MissingScheduleE);
            false
        }
        Some(answer) => answer,
    };

    ScheduleSelections {
        schedule_c,
        schedule_d,
        schedule_e,
    }
}

fn validate_factor(
    value: Option<&FactorValue>,
    factor: FactorKind,
    pricing: &FactorPricing,
    errors: &mut Vec<ValidationError>,
) -> Option<FactorValue> {
    match (value, pricing) {
        (None, _) => {
            errors.push(ValidationError::MissingFactor(factor));
            None
        }
        (Some(FactorValue::Count(count)), FactorPricing::PerUnit { .. }) => {
            Some(FactorValue::Count(*count))
        }
        (Some(FactorValue::Band(label)), FactorPricing::Banded(tiers)) => {
            if tiers.iter().any(|tier| tier.label == *label) {
                Some(FactorValue::Band(label.clone()))
            } else {
                errors.push(ValidationError::UnknownBandLabel {
                    factor,
                    label: label.clone(),
                });
                None
            }
        }
        (Some(FactorValue::Count(_)), FactorPricing::Banded(_)) => {
            errors.push(ValidationError::WrongFactorShape {
                factor,
                expected: "a tier selection",
            });
            None
        }
        (Some(FactorValue::Band(_)), FactorPricing::PerUnit { .. }) => {
            errors.push(ValidationError::WrongFactorShape {
                factor,
                expected: "a count",
            });
            None
        }
    }
}
