//! Payment cards and the attach-source request.
//!
//! Form keys use the remote parameter names (`address_city`, `address_zip`,
//! ...) even where the struct field reads more naturally.

use serde::Deserialize;

use super::nullable;
use crate::form::{field_key, AppendForm, FormBody, FormRequest};

/// A payment card, either raw card data on the way in or a tokenized card
/// on the way out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Card {
    /// ID of the tokenized card.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Always `card`.
    #[serde(deserialize_with = "nullable")]
    pub object: String,

    /// Two-digit expiration month.
    #[serde(rename = "exp_month", deserialize_with = "nullable")]
    pub expiration_month: i64,
    /// Two- or four-digit expiration year.
    #[serde(rename = "exp_year", deserialize_with = "nullable")]
    pub expiration_year: i64,
    /// Card number without separators. Never echoed back by the service.
    #[serde(rename = "number", deserialize_with = "nullable")]
    pub card_number: String,

    /// Security code. Only mandatory for some regions but always
    /// recommended.
    pub cvc: Option<String>,

    #[serde(rename = "name")]
    pub cardholder_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    #[serde(rename = "address_city")]
    pub city: Option<String>,
    #[serde(rename = "address_state")]
    pub state: Option<String>,
    #[serde(rename = "address_zip")]
    pub zipcode: Option<String>,
    #[serde(rename = "address_country")]
    pub country: Option<String>,
    /// Payout currency for debit cards added to connected accounts.
    pub currency: Option<String>,

    /// Customer the card is attached to, if any.
    pub customer: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub fingerprint: String,
    #[serde(rename = "last4", deserialize_with = "nullable")]
    pub last_four: String,
    #[serde(deserialize_with = "nullable")]
    pub brand: String,
    #[serde(deserialize_with = "nullable")]
    pub cvc_check: String,
}

impl AppendForm for Card {
    fn append_form(&self, form: &mut FormBody, key: &str) {
        form.set_i64(field_key(key, "exp_month"), self.expiration_month);
        form.set_i64(field_key(key, "exp_year"), self.expiration_year);
        form.set_str(field_key(key, "number"), &self.card_number);
        form.set_opt_str(field_key(key, "cvc"), self.cvc.as_deref());
        form.set_opt_str(field_key(key, "name"), self.cardholder_name.as_deref());
        form.set_opt_str(field_key(key, "address_line1"), self.address_line1.as_deref());
        form.set_opt_str(field_key(key, "address_line2"), self.address_line2.as_deref());
        form.set_opt_str(field_key(key, "address_city"), self.city.as_deref());
        form.set_opt_str(field_key(key, "address_state"), self.state.as_deref());
        form.set_opt_str(field_key(key, "address_zip"), self.zipcode.as_deref());
        form.set_opt_str(field_key(key, "address_country"), self.country.as_deref());
        form.set_opt_str(field_key(key, "currency"), self.currency.as_deref());
    }
}

impl FormRequest for Card {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(4);
        self.append_form(&mut form, "");
        form
    }
}

/// Body of the attach-source call: the token to attach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRequest {
    pub source: String,
}

impl FormRequest for SourceRequest {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(1);
        form.set_str("source", &self.source);
        form
    }
}
