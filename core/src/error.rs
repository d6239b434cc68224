//! Error types for the payments API client.
//!
//! # Design
//! Every failed call surfaces exactly one variant. `Domain` carries the
//! remote service's own classification decoded from a 400/404 body;
//! `Unauthorized` is a fixed sentinel for 401 and never looks at the body.
//! Any other status lands in `UnexpectedStatus` with enough context to
//! find the offending call. A body that cannot be decoded, including an
//! error body, is a `Decode` error and never a defaulted record.

use serde::Deserialize;
use thiserror::Error;

use crate::http::{HttpMethod, TransportError};
use crate::types::nullable;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The client was constructed with an empty API key.
    #[error("invalid API key, cannot be empty")]
    EmptyApiKey,

    /// The configured base URL does not parse.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The outgoing request could not be assembled.
    #[error("error creating request: {0}")]
    Request(String),

    /// The round-trip itself failed; the server may never have seen it.
    #[error("error performing request: {0}")]
    Transport(#[source] TransportError),

    /// The server answered 401.
    #[error("unauthorized, 401 status code encountered")]
    Unauthorized,

    /// The server answered 400 or 404 with an error envelope.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Any status outside the handled set.
    #[error("unexpected status code of {status} for {method} {url}")]
    UnexpectedStatus {
        status: u16,
        method: HttpMethod,
        url: String,
    },

    /// The response body is not the JSON shape the caller asked for.
    #[error("error encountered while attempting to decode response as JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// `add_card` failed while tokenizing the card; no attach was attempted.
    #[error("error creating card token: {0}")]
    CardToken(#[source] Box<Error>),

    /// `add_card` tokenized the card but could not attach it to the customer.
    #[error("error attaching card to customer: {0}")]
    AttachSource(#[source] Box<Error>),
}

impl Error {
    /// The remote domain error behind this error, looking through the
    /// `add_card` step wrappers.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Error::Domain(err) => Some(err),
            Error::CardToken(inner) | Error::AttachSource(inner) => inner.domain(),
            _ => None,
        }
    }
}

/// Error record returned by the remote service.
///
/// Displays as the remote message alone, which is what end users are meant
/// to see for card errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Error)]
#[error("{message}")]
#[serde(default)]
pub struct DomainError {
    /// One of `api_error`, `card_error`, `idempotency_error`,
    /// `invalid_request_error` and friends.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    /// Short machine-readable code, e.g. `resource_missing`.
    #[serde(deserialize_with = "nullable")]
    pub code: String,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    /// Parameter the error refers to, when it is parameter-specific.
    pub param: Option<String>,
    /// Issuer's reason for a card decline, when one was given.
    pub decline_code: Option<String>,
    pub doc_url: Option<String>,
}

/// `{"error": {...}}` wrapper the remote service puts around `DomainError`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: DomainError,
}
