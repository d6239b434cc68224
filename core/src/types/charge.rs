//! Charges and the ID-or-inline-card `Source` value.

use serde::Deserialize;

use super::{nullable, Card, Dictionary};
use crate::form::{AppendForm, FormBody, FormRequest};

/// Payment source: a bare ID on the way in, usually an inline card object
/// on the way out.
///
/// Decoding tries the bare ID first and falls back to the inline card;
/// anything that is neither fails the decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Id(String),
    Card(Box<Card>),
}

impl Source {
    /// ID of the source, whichever shape it arrived in.
    pub fn id(&self) -> &str {
        match self {
            Source::Id(id) => id,
            Source::Card(card) => &card.id,
        }
    }

    pub fn card(&self) -> Option<&Card> {
        match self {
            Source::Id(_) => None,
            Source::Card(card) => Some(card),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Id(String::new())
    }
}

impl From<&str> for Source {
    fn from(id: &str) -> Self {
        Source::Id(id.to_string())
    }
}

impl From<String> for Source {
    fn from(id: String) -> Self {
        Source::Id(id)
    }
}

/// A charge against a card or customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Charge {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub object: String,
    #[serde(deserialize_with = "nullable")]
    pub balance_transaction: String,
    pub captured: bool,
    pub disputed: bool,
    pub paid: bool,
    pub refunded: bool,
    #[serde(deserialize_with = "nullable")]
    pub amount_refunded: i64,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub created: i64,

    /// Amount in the smallest currency unit; $1.59 is `159`.
    #[serde(deserialize_with = "nullable")]
    pub amount: i64,
    /// Three-letter ISO currency code, e.g. `usd`.
    #[serde(deserialize_with = "nullable")]
    pub currency: String,
    /// ID of the customer being charged.
    #[serde(deserialize_with = "nullable")]
    pub customer: String,
    #[serde(deserialize_with = "nullable")]
    pub source: Source,

    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub metadata: Dictionary,
}

impl FormRequest for Charge {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(4);
        form.set_i64("amount", self.amount);
        form.set_str("currency", &self.currency);
        form.set_str("customer", &self.customer);
        form.set_str("source", self.source.id());
        form.set_opt_str("description", self.description.as_deref());
        self.metadata.append_form(&mut form, "metadata");
        form
    }
}
