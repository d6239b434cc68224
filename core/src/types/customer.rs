//! Customer records.
//!
//! # Design
//! One struct serves create, update and every customer response. Deleted
//! customers come back as a stub carrying only `id`, `object` and
//! `deleted`.

use serde::Deserialize;

use super::{nullable, Address, Dictionary, InvoiceSettings};
use crate::form::{AppendForm, FormBody, FormRequest};

/// A customer record.
///
/// The same struct is sent on create/update and decoded from every
/// customer response. A deleted customer decodes with `deleted` set and
/// every optional field absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Customer {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub object: String,

    pub name: Option<String>,
    pub description: Option<String>,
    pub discount: Option<String>,
    pub email: Option<String>,
    pub default_source: Option<String>,
    pub phone: Option<String>,

    #[serde(deserialize_with = "nullable")]
    pub metadata: Dictionary,
    pub address: Option<Address>,

    #[serde(deserialize_with = "nullable")]
    pub balance: i64,
    #[serde(deserialize_with = "nullable")]
    pub currency: String,

    pub invoice_prefix: Option<String>,
    pub invoice_settings: Option<InvoiceSettings>,
    pub next_invoice_sequence: Option<i64>,

    pub tax_exempt: Option<String>,

    pub livemode: Option<bool>,
    pub delinquent: Option<bool>,
    pub deleted: Option<bool>,

    #[serde(deserialize_with = "nullable")]
    pub preferred_locales: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub shipping: Dictionary,

    #[serde(deserialize_with = "nullable")]
    pub created: i64,
}

impl Customer {
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }
}

impl FormRequest for Customer {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(6);
        form.set_opt_str("name", self.name.as_deref());
        form.set_opt_str("description", self.description.as_deref());
        form.set_opt_str("discount", self.discount.as_deref());
        form.set_opt_str("email", self.email.as_deref());
        form.set_opt_str("default_source", self.default_source.as_deref());
        form.set_opt_str("phone", self.phone.as_deref());
        form.set_i64("balance", self.balance);
        form.set_str("currency", &self.currency);
        form.set_opt_str("invoice_prefix", self.invoice_prefix.as_deref());
        form.set_opt_i64("next_invoice_sequence", self.next_invoice_sequence);
        form.set_opt_str("tax_exempt", self.tax_exempt.as_deref());
        form.set_list("preferred_locales", &self.preferred_locales);

        self.metadata.append_form(&mut form, "metadata");
        self.address.append_form(&mut form, "address");
        self.invoice_settings.append_form(&mut form, "invoice_settings");
        self.shipping.append_form(&mut form, "shipping");
        form
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_customer_sends_only_balance() {
        let form = Customer::default().to_form();
        assert_eq!(form.entries(), &[("balance".to_string(), "0".to_string())]);
    }

    #[test]
    fn present_fields_appear_exactly_once() {
        let customer = Customer {
            name: Some("Test".to_string()),
            email: Some(String::new()),
            next_invoice_sequence: Some(7),
            currency: "usd".to_string(),
            ..Default::default()
        };
        let form = customer.to_form();
        for key in ["name", "email", "next_invoice_sequence", "currency"] {
            let count = form.entries().iter().filter(|(k, _)| k == key).count();
            assert_eq!(count, 1, "{key}");
        }
        assert_eq!(form.get("name"), Some("Test"));
        assert_eq!(form.get("email"), Some(""));
        assert_eq!(form.get("next_invoice_sequence"), Some("7"));
        for key in ["description", "discount", "phone", "invoice_prefix", "tax_exempt"] {
            assert!(!form.contains_key(key), "{key}");
        }
    }

    #[test]
    fn nested_values_flatten_with_brackets() {
        let customer = Customer {
            metadata: [("foo".to_string(), "bar".to_string())].into_iter().collect(),
            shipping: [("name".to_string(), "Home".to_string())].into_iter().collect(),
            preferred_locales: vec!["en-US".to_string()],
            address: Some(Address {
                city: "Berlin".to_string(),
                ..Default::default()
            }),
            invoice_settings: Some(InvoiceSettings {
                footer: Some("thanks".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let got: HashSet<(String, String)> = customer.to_form().into_iter().collect();
        let want: HashSet<(String, String)> = [
            ("balance", "0"),
            ("preferred_locales[0]", "en-US"),
            ("metadata[foo]", "bar"),
            ("address[city]", "Berlin"),
            ("invoice_settings[footer]", "thanks"),
            ("shipping[name]", "Home"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn deleted_customer_decodes_without_name() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":"cus_1","object":"customer","deleted":true}"#).unwrap();
        assert_eq!(customer.id, "cus_1");
        assert!(customer.is_deleted());
        assert!(customer.name.is_none());
    }

    #[test]
    fn decodes_nulls_from_live_shape() {
        let customer: Customer = serde_json::from_str(
            r#"{"id":"cus_1","object":"customer","name":"Test","address":null,"balance":0,
                "currency":null,"metadata":{"foo":"bar"},"preferred_locales":["en-US"],
                "shipping":null,"invoice_settings":{"custom_fields":null,"footer":null},
                "livemode":false,"created":1700000000}"#,
        )
        .unwrap();
        assert_eq!(customer.name.as_deref(), Some("Test"));
        assert!(customer.address.is_none());
        assert_eq!(customer.currency, "");
        assert_eq!(customer.metadata.get("foo").map(String::as_str), Some("bar"));
        assert!(customer.shipping.is_empty());
        assert_eq!(customer.invoice_settings, Some(InvoiceSettings::default()));
    }
}
