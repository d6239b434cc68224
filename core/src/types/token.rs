//! Card tokens and the create-token request.

use serde::Deserialize;

use super::{nullable, Card};
use crate::form::{AppendForm, FormBody, FormRequest};

/// One-time token standing in for card data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Token {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub object: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,

    #[serde(deserialize_with = "nullable")]
    pub card: Card,

    pub client_ip: Option<String>,
    pub livemode: Option<bool>,
    pub used: Option<bool>,

    #[serde(deserialize_with = "nullable")]
    pub created: i64,
}

/// Body of the create-token call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardTokenRequest {
    pub card: Card,
}

impl FormRequest for CardTokenRequest {
    fn to_form(&self) -> FormBody {
        let mut form = FormBody::with_capacity(4);
        self.card.append_form(&mut form, "card");
        form
    }
}
