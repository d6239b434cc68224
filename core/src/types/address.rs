//! Postal address and invoice settings nested under a customer.

use serde::Deserialize;

use super::{nullable, Dictionary};
use crate::form::{field_key, AppendForm, FormBody};

/// Postal address attached to a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Address {
    /// City, district, suburb, town, or village.
    #[serde(deserialize_with = "nullable")]
    pub city: String,
    /// Two-letter country code (ISO 3166-1 alpha-2).
    #[serde(deserialize_with = "nullable")]
    pub country: String,
    /// Street address, PO box, or company name.
    #[serde(deserialize_with = "nullable")]
    pub line1: String,
    /// Apartment, suite, unit, or building.
    #[serde(deserialize_with = "nullable")]
    pub line2: String,
    #[serde(deserialize_with = "nullable")]
    pub postal_code: String,
    /// State, county, province, or region.
    #[serde(deserialize_with = "nullable")]
    pub state: String,
}

impl AppendForm for Address {
    fn append_form(&self, form: &mut FormBody, key: &str) {
        form.set_str(field_key(key, "line1"), &self.line1);
        form.set_str(field_key(key, "line2"), &self.line2);
        form.set_str(field_key(key, "city"), &self.city);
        form.set_str(field_key(key, "state"), &self.state);
        form.set_str(field_key(key, "postal_code"), &self.postal_code);
        form.set_str(field_key(key, "country"), &self.country);
    }
}

/// Invoice defaults for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InvoiceSettings {
    #[serde(deserialize_with = "nullable")]
    pub custom_fields: Dictionary,
    pub default_payment_method: Option<String>,
    pub footer: Option<String>,
}

impl AppendForm for InvoiceSettings {
    fn append_form(&self, form: &mut FormBody, key: &str) {
        self.custom_fields
            .append_form(form, &field_key(key, "custom_fields"));
        form.set_opt_str(
            field_key(key, "default_payment_method"),
            self.default_payment_method.as_deref(),
        );
        form.set_opt_str(field_key(key, "footer"), self.footer.as_deref());
    }
}
