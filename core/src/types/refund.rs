//! Refund requests, refunds and their reason and status enums.

use serde::Deserialize;

use super::{nullable, Dictionary};
use crate::form::{AppendForm, FormBody, FormRequest};

/// Why a charge is being refunded.
///
/// Reasons this crate does not name decode into `Other` with the wire value
/// intact, so a decoded request is sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RefundReason {
    Duplicate,
    /// Also adds the card and email to the account's block lists.
    Fraudulent,
    RequestedByCustomer,
    Other(String),
}

impl RefundReason {
    pub fn as_str(&self) -> &str {
        match self {
            RefundReason::Duplicate => "duplicate",
            RefundReason::Fraudulent => "fraudulent",
            RefundReason::RequestedByCustomer => "requested_by_customer",
            RefundReason::Other(reason) => reason,
        }
    }
}

impl From<String> for RefundReason {
    fn from(reason: String) -> Self {
        match reason.as_str() {
            "duplicate" => RefundReason::Duplicate,
            "fraudulent" => RefundReason::Fraudulent,
            "requested_by_customer" => RefundReason::RequestedByCustomer,
            _ => RefundReason::Other(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

/// Body of the create-refund call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefundRequest {
    /// ID of the charge to refund.
    #[serde(deserialize_with = "nullable")]
    pub charge: String,
    /// Amount in the smallest currency unit.
    #[serde(deserialize_with = "nullable")]
    pub amount: i64,
    /// Posting an empty value for a key unsets it.
    #[serde(deserialize_with = "nullable")]
    pub metadata: Dictionary,
    /// ID of the PaymentIntent to refund.
    pub payment_intent: Option<String>,
    pub reason: Option<RefundReason>,
}

impl FormRequest for RefundRequest {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(5);
        form.set_str("charge", &self.charge);
        form.set_i64("amount", self.amount);
        form.set_opt_str("payment_intent", self.payment_intent.as_deref());
        form.set_opt_str("reason", self.reason.as_ref().map(RefundReason::as_str));
        self.metadata.append_form(&mut form, "metadata");
        form
    }
}

/// A refund as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Refund {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub object: String,

    #[serde(flatten)]
    pub request: RefundRequest,

    pub balance_transaction: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub currency: String,

    pub status: Option<RefundStatus>,
    #[serde(deserialize_with = "nullable")]
    pub created: i64,

    pub receipt_number: Option<String>,
    pub source_transfer_reversal: Option<String>,
    pub transfer_reversal: Option<String>,
}
