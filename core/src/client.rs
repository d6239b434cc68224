//! Blocking client for the payments API.
//!
//! # Design
//! `Client` holds an immutable configuration and a transport and carries
//! no mutable state between calls. Every operation goes through the same
//! pipeline: `build_request` encodes the record and adds auth,
//! the transport performs the round-trip, and `parse_response` classifies
//! the status and decodes the body. Both halves are public so callers can
//! drive their own I/O, as the tests do.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::form::FormRequest;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::response::{classify, decode_into};
use crate::types::{
    Card, CardTokenRequest, Charge, Customer, List, Refund, RefundRequest, SourceRequest, Token,
};

pub const API_VERSION: &str = "v1";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous client. Each operation performs one round-trip, except
/// `add_card` which performs two.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    base_url: Url,
    api_key: String,
    transport: T,
}

impl Client<UreqTransport> {
    /// Client against the public host with no timeout.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::from_config(Config::new(api_key))
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: Config, transport: T) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::EmptyApiKey);
        }
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            base_url,
            api_key: config.api_key,
            transport,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn create_customer(&self, customer: &Customer) -> Result<Customer> {
        let mut created = Customer::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Customers,
            Some(customer as &dyn FormRequest),
            Some(&mut created),
        )?;
        Ok(created)
    }

    pub fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        let mut customer = Customer::default();
        self.request(
            HttpMethod::Get,
            Endpoint::Customer(customer_id),
            None,
            Some(&mut customer),
        )?;
        Ok(customer)
    }

    pub fn update_customer(&self, customer_id: &str, customer: &Customer) -> Result<Customer> {
        let mut updated = Customer::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Customer(customer_id),
            Some(customer as &dyn FormRequest),
            Some(&mut updated),
        )?;
        Ok(updated)
    }

    pub fn delete_customer(&self, customer_id: &str) -> Result<()> {
        self.request::<()>(HttpMethod::Delete, Endpoint::Customer(customer_id), None, None)
    }

    /// Exchanges raw card data for a one-time token.
    pub fn create_card_token(&self, card: &Card) -> Result<Token> {
        let request = CardTokenRequest { card: card.clone() };
        let mut created = Token::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Tokens,
            Some(&request as &dyn FormRequest),
            Some(&mut created),
        )?;
        Ok(created)
    }

    /// Tokenizes `card` and attaches the token to the customer.
    ///
    /// A tokenization failure returns `Error::CardToken` without attempting
    /// the attach; an attach failure returns `Error::AttachSource`.
    pub fn add_card(&self, customer_id: &str, card: &Card) -> Result<Card> {
        let token = self
            .create_card_token(card)
            .map_err(|err| Error::CardToken(Box::new(err)))?;

        let request = SourceRequest { source: token.id };
        let mut attached = Card::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Sources(customer_id),
            Some(&request as &dyn FormRequest),
            Some(&mut attached),
        )
        .map_err(|err| Error::AttachSource(Box::new(err)))?;
        Ok(attached)
    }

    /// Cards attached to the customer. Only the first page is returned.
    pub fn list_cards(&self, customer_id: &str) -> Result<Vec<Card>> {
        let mut list = List::<Card>::default();
        self.request(
            HttpMethod::Get,
            Endpoint::Sources(customer_id),
            None,
            Some(&mut list),
        )?;
        Ok(list.data)
    }

    pub fn remove_card(&self, customer_id: &str, card_id: &str) -> Result<()> {
        self.request::<()>(
            HttpMethod::Delete,
            Endpoint::Source {
                customer: customer_id,
                card: card_id,
            },
            None,
            None,
        )
    }

    pub fn create_charge(&self, charge: &Charge) -> Result<Charge> {
        let mut created = Charge::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Charges,
            Some(charge as &dyn FormRequest),
            Some(&mut created),
        )?;
        Ok(created)
    }

    pub fn create_refund(&self, refund: &RefundRequest) -> Result<Refund> {
        let mut created = Refund::default();
        self.request(
            HttpMethod::Post,
            Endpoint::Refunds,
            Some(refund as &dyn FormRequest),
            Some(&mut created),
        )?;
        Ok(created)
    }

    /// Assembles the outgoing request: versioned URL, bearer auth, and a
    /// form body when `request` is given.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: Endpoint<'_>,
        request: Option<&dyn FormRequest>,
    ) -> Result<HttpRequest> {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/{API_VERSION}{}", endpoint.path()));

        let mut headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )];
        let body = match request {
            Some(request) => {
                let encoded = request
                    .to_form()
                    .encode()
                    .map_err(|err| Error::Request(err.to_string()))?;
                headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                Some(encoded)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Classifies `response` and, on success, decodes it into `target`.
    pub fn parse_response<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
        target: Option<&mut R>,
    ) -> Result<()> {
        classify(request.method, &request.url, response)?;
        decode_into(&response.body, target)
    }

    fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: Endpoint<'_>,
        request: Option<&dyn FormRequest>,
        target: Option<&mut R>,
    ) -> Result<()> {
        let req = self.build_request(method, endpoint, request)?;
        debug!(method = %req.method, url = %req.url, "sending request");

        let response = self.transport.send(&req).map_err(Error::Transport)?;
        debug!(status = response.status, url = %req.url, "received response");

        self.parse_response(&req, &response, target)
    }
}
