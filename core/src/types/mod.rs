//! Resource records exchanged with the payments API.
//!
//! # Design
//! Each record is one struct used for both directions: request-side fields
//! are written by its `FormRequest`/`AppendForm` impl, and the whole struct
//! decodes from the JSON the service returns. Fields the service may send
//! as `null` decode through `nullable` so a missing value reads as the
//! default instead of failing the whole response.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

mod address;
mod card;
mod charge;
mod customer;
mod refund;
mod token;

pub use address::{Address, InvoiceSettings};
pub use card::{Card, SourceRequest};
pub use charge::{Charge, Source};
pub use customer::Customer;
pub use refund::{Refund, RefundReason, RefundRequest, RefundStatus};
pub use token::{CardTokenRequest, Token};

/// Free-form string map used for metadata and similar fields.
pub type Dictionary = HashMap<String, String>;

/// Envelope the service wraps around list results. Only `data` is used.
#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    #[serde(default, deserialize_with = "nullable")]
    pub object: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub data: Vec<T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self {
            object: String::new(),
            url: String::new(),
            has_more: false,
            data: Vec::new(),
        }
    }
}

/// Decodes `null` as `T::default()`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
