//! Blocking client for a card-payments REST API.
//!
//! # Overview
//! Models customers, cards, tokens, charges and refunds as typed records,
//! encodes them as form bodies, and decodes JSON responses back into
//! records or into a structured error.
//!
//! # Design
//! - `Client` is stateless beyond its immutable `Config`; calls are
//!   independent and never retried.
//! - Requests are split into `build_request` and `parse_response` around a
//!   pluggable `Transport`, so the marshaling layer is testable without a
//!   network. `UreqTransport` is the default.
//! - Request records implement `FormRequest`; nested values implement
//!   `AppendForm` and write bracketed keys beneath their parent.
//! - Status handling is a fixed table (see `response::classify`).

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod form;
pub mod http;
pub mod response;
pub mod types;

pub use client::{Client, API_VERSION};
pub use config::{Config, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use error::{DomainError, Error, ErrorEnvelope, Result};
pub use form::{AppendForm, FormBody, FormRequest};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use types::{
    Address, Card, CardTokenRequest, Charge, Customer, Dictionary, InvoiceSettings, List, Refund,
    RefundReason, RefundRequest, RefundStatus, Source, SourceRequest, Token,
};
