mod fee_schedule;
mod filing_status;
mod quote_breakdown;
mod quote_input;
mod quote_request;

pub use fee_schedule::{
    BandFee, BaseFeeRule, FactorKind, FactorPricing, FeeScheduleConfig, FeeScheduleError,
    ForeignIncomeHandling, ScheduleCFees, ScheduleFees,
};
pub use filing_status::{DeductionType, FilingStatus, ScheduleCIncomeBand};
pub use quote_breakdown::QuoteBreakdown;
pub use quote_input::{QuoteInput, ScheduleSelections};
pub use quote_request::{FactorValue, QuoteRequest};
