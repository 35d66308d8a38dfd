//! Lead delivery: relaying a computed quote to an external endpoint.
//!
//! This is a collaborator of the quote engine, not part of it. Delivery is
//! fire-and-forget; a failed relay is logged and swallowed, and must never
//! block or fail the quote computation that produced the lead.

use std::sync::Arc;

use async_trait::async_trait;
use quote_core::{DeductionType, FactorValue, FilingStatus, QuoteBreakdown, QuoteInput};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::warn;

/// Errors from a single delivery attempt. Callers going through
/// [`send_in_background`] never see these.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("lead transport error: {0}")]
    Transport(String),

    #[error("lead endpoint returned status {0}")]
    Endpoint(u16),
}

/// The wire shape relayed to a lead endpoint: the client's answers plus the
/// quoted total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLead {
    pub name: String,
    pub email: String,
    pub quote_total: Decimal,
    pub filing_status: FilingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduction_type: Option<DeductionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_c: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_d: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_e: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owns_home: Option<bool>,
    pub k1_forms: FactorValue,
    pub jurisdictions: FactorValue,
    pub has_foreign_income: bool,
}

impl QuoteLead {
    pub fn new(input: &QuoteInput, breakdown: &QuoteBreakdown) -> Self {
        Self {
            name: input.client_name.clone(),
            email: input.client_email.clone(),
            quote_total: breakdown.total,
            filing_status: input.filing_status,
            deduction_type: input.deduction_type,
            schedule_c: input
                .schedules
                .as_ref()
                .map(|s| s.schedule_c.is_some()),
            schedule_d: input.schedules.as_ref().map(|s| s.schedule_d),
            schedule_e: input.schedules.as_ref().map(|s| s.schedule_e),
            owns_home: input.owns_home,
            k1_forms: input.k1_forms.clone(),
            jurisdictions: input.jurisdictions.clone(),
            has_foreign_income: input.has_foreign_income,
        }
    }
}

/// A destination that accepts computed leads.
#[async_trait]
pub trait LeadDelivery: Send + Sync {
    async fn deliver(&self, lead: &QuoteLead) -> Result<(), DeliveryError>;
}

/// Relays leads as a JSON POST to a caller-supplied form-relay or webhook
/// endpoint.
pub struct FormRelayDelivery {
    client: reqwest::Client,
    endpoint: String,
}

impl FormRelayDelivery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LeadDelivery for FormRelayDelivery {
    async fn deliver(&self, lead: &QuoteLead) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(lead)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::Endpoint(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Spawns the delivery and swallows its outcome: failures are logged at
/// warn level and never propagate to the quoting path.
pub fn send_in_background<D>(delivery: Arc<D>, lead: QuoteLead) -> JoinHandle<()>
where
    D: LeadDelivery + ?Sized + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = delivery.deliver(&lead).await {
            warn!(%error, email = %lead.email, "lead delivery failed; quote is unaffected");
        }
    })
}
