//! In-memory stand-in for the card-payments API.
//!
//! Serves the `/v1` customer, token, source, charge and refund endpoints
//! with the same status codes and error envelopes as the real service, so
//! client tests can run end-to-end without network access or live keys.

pub mod form;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "sk_test_mock";

/// Card number that is always declined.
pub const DECLINED_CARD: &str = "4000000000000002";

#[derive(Default)]
pub struct Store {
    customers: HashMap<String, CustomerEntry>,
    tokens: HashMap<String, TokenEntry>,
    card_numbers: HashMap<String, String>,
    charges: HashMap<String, Map<String, Value>>,
}

struct CustomerEntry {
    record: Map<String, Value>,
    sources: Vec<Value>,
    deleted: bool,
}

struct TokenEntry {
    card: Value,
    number: String,
    used: bool,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

/// Error envelope response, `{"error": {...}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: Map<String, Value>,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        let mut error = Map::new();
        error.insert("type".to_string(), json!(kind));
        error.insert("message".to_string(), json!(message.into()));
        Self { status, error }
    }

    fn with(mut self, field: &str, value: &str) -> Self {
        self.error.insert(field.to_string(), json!(value));
        self
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request_error", message)
    }

    fn missing_param(param: &str) -> Self {
        Self::invalid(format!("Missing required param: {param}."))
            .with("code", "parameter_missing")
            .with("param", param)
    }

    fn not_found(resource: &str, id: &str, param: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "invalid_request_error",
            format!("No such {resource}: '{id}'"),
        )
        .with("code", "resource_missing")
        .with("param", param)
    }

    fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_request_error",
            "Invalid API Key provided.",
        )
    }

    fn card_error(code: &str, message: &str) -> Self {
        Self::new(StatusCode::PAYMENT_REQUIRED, "card_error", message).with("code", code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

/// Router that accepts only `Authorization: Bearer <api_key>`.
pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Db::default(),
    };
    Router::new()
        .route("/v1/customers", post(create_customer))
        .route(
            "/v1/customers/{id}",
            get(get_customer).post(update_customer).delete(delete_customer),
        )
        .route(
            "/v1/customers/{id}/sources",
            get(list_sources).post(attach_source),
        )
        .route("/v1/customers/{id}/sources/{card_id}", delete(detach_source))
        .route("/v1/tokens", post(create_token))
        .route("/v1/charges", post(create_charge))
        .route("/v1/refunds", post(create_refund))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, DEFAULT_API_KEY).await
}

pub async fn serve(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|key| key == &*state.api_key);
    if !authorized {
        return ApiError::unauthorized().into_response();
    }
    next.run(request).await
}

// --- helpers ---

fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &raw[..14])
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn parse_form(body: &str) -> Result<Map<String, Value>, ApiError> {
    form::parse(body).map_err(|err| ApiError::invalid(format!("Invalid request body: {err}")))
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn deleted_stub(id: &str, object: &str) -> Value {
    json!({ "id": id, "object": object, "deleted": true })
}

/// Writes posted fields onto a stored record. An empty value unsets the
/// field; metadata is merged key by key and an empty value removes the key.
fn merge(record: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (key, value) in fields {
        match value {
            Value::Object(entries) if key == "metadata" => {
                let metadata = record
                    .entry("metadata")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(metadata) = metadata {
                    for (k, v) in entries {
                        if v.as_str() == Some("") {
                            metadata.remove(&k);
                        } else {
                            metadata.insert(k, v);
                        }
                    }
                }
            }
            Value::String(s) if s.is_empty() => {
                record.insert(key, Value::Null);
            }
            value => {
                record.insert(key, value);
            }
        }
    }
}

fn live_customer<'a>(store: &'a mut Store, id: &str) -> Result<&'a mut CustomerEntry, ApiError> {
    store
        .customers
        .get_mut(id)
        .filter(|entry| !entry.deleted)
        .ok_or_else(|| ApiError::not_found("customer", id, "id"))
}

fn card_brand(number: &str) -> &'static str {
    match number.as_bytes().first() {
        Some(b'4') => "Visa",
        Some(b'5') => "MasterCard",
        Some(b'3') => "American Express",
        _ => "Unknown",
    }
}

// --- customers ---

async fn create_customer(State(state): State<AppState>, body: String) -> ApiResult {
    let fields = parse_form(&body)?;
    let id = new_id("cus");
    let mut record = match json!({
        "id": id,
        "object": "customer",
        "address": null,
        "balance": 0,
        "created": now(),
        "currency": null,
        "default_source": null,
        "delinquent": false,
        "description": null,
        "discount": null,
        "email": null,
        "invoice_prefix": id[4..12].to_uppercase(),
        "invoice_settings": {
            "custom_fields": null,
            "default_payment_method": null,
            "footer": null
        },
        "livemode": false,
        "metadata": {},
        "name": null,
        "next_invoice_sequence": 1,
        "phone": null,
        "preferred_locales": [],
        "shipping": null,
        "tax_exempt": "none"
    }) {
        Value::Object(record) => record,
        _ => Map::new(),
    };
    merge(&mut record, fields);
    debug!(%id, "customer created");

    let response = Value::Object(record.clone());
    state.db.write().await.customers.insert(
        id,
        CustomerEntry {
            record,
            sources: Vec::new(),
            deleted: false,
        },
    );
    Ok(Json(response))
}

async fn get_customer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.db.read().await;
    let entry = store
        .customers
        .get(&id)
        .ok_or_else(|| ApiError::not_found("customer", &id, "id"))?;
    if entry.deleted {
        return Ok(Json(deleted_stub(&id, "customer")));
    }
    Ok(Json(Value::Object(entry.record.clone())))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> ApiResult {
    let fields = parse_form(&body)?;
    let mut store = state.db.write().await;
    let entry = live_customer(&mut store, &id)?;
    merge(&mut entry.record, fields);
    Ok(Json(Value::Object(entry.record.clone())))
}

async fn delete_customer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut store = state.db.write().await;
    let entry = live_customer(&mut store, &id)?;
    entry.deleted = true;
    entry.sources.clear();
    debug!(%id, "customer deleted");
    Ok(Json(deleted_stub(&id, "customer")))
}

// --- tokens and sources ---

async fn create_token(State(state): State<AppState>, body: String) -> ApiResult {
    let fields = parse_form(&body)?;
    let card = fields
        .get("card")
        .and_then(Value::as_object)
        .ok_or_else(|| ApiError::missing_param("card"))?;
    let number = str_field(card, "number")
        .ok_or_else(|| ApiError::missing_param("card[number]"))?
        .to_string();
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::card_error(
            "invalid_number",
            "The card number is not a valid credit card number.",
        )
        .with("param", "number"));
    }
    let exp_month = card.get("exp_month").and_then(Value::as_i64).unwrap_or(0);
    let exp_year = card.get("exp_year").and_then(Value::as_i64).unwrap_or(0);
    if !(1..=12).contains(&exp_month) {
        return Err(ApiError::card_error(
            "invalid_expiry_month",
            "Your card's expiration month is invalid.",
        )
        .with("param", "exp_month"));
    }
    if exp_year <= 0 {
        return Err(ApiError::card_error(
            "invalid_expiry_year",
            "Your card's expiration year is invalid.",
        )
        .with("param", "exp_year"));
    }

    let last4 = &number[number.len().saturating_sub(4)..];
    let card_id = new_id("card");
    let card_json = json!({
        "id": card_id,
        "object": "card",
        "address_city": card.get("address_city"),
        "address_country": card.get("address_country"),
        "address_line1": card.get("address_line1"),
        "address_line2": card.get("address_line2"),
        "address_state": card.get("address_state"),
        "address_zip": card.get("address_zip"),
        "brand": card_brand(&number),
        "currency": card.get("currency"),
        "customer": null,
        "cvc_check": if card.contains_key("cvc") { json!("unchecked") } else { Value::Null },
        "exp_month": exp_month,
        "exp_year": exp_year,
        "fingerprint": format!("fp{last4}{exp_year}"),
        "funding": "credit",
        "last4": last4,
        "name": card.get("name"),
    });

    let token_id = new_id("tok");
    let token = json!({
        "id": token_id,
        "object": "token",
        "type": "card",
        "card": card_json,
        "client_ip": null,
        "created": now(),
        "livemode": false,
        "used": false,
    });

    let mut store = state.db.write().await;
    store.card_numbers.insert(card_id, number.clone());
    store.tokens.insert(
        token_id,
        TokenEntry {
            card: card_json,
            number,
            used: false,
        },
    );
    Ok(Json(token))
}

/// Marks the token used and returns its card and number.
fn redeem_token(
    store: &mut Store,
    token_id: &str,
    param: &str,
) -> Result<(Value, String), ApiError> {
    let token = store
        .tokens
        .get_mut(token_id)
        .ok_or_else(|| {
            ApiError::invalid(format!("No such token: '{token_id}'"))
                .with("code", "resource_missing")
                .with("param", param)
        })?;
    if token.used {
        return Err(ApiError::invalid(format!(
            "You cannot use a Stripe token more than once: {token_id}."
        ))
        .with("code", "token_already_used"));
    }
    token.used = true;
    Ok((token.card.clone(), token.number.clone()))
}

async fn attach_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> ApiResult {
    let fields = parse_form(&body)?;
    let token_id = str_field(&fields, "source")
        .ok_or_else(|| ApiError::missing_param("source"))?
        .to_string();

    let mut store = state.db.write().await;
    live_customer(&mut store, &id)?;
    let (mut card, _) = redeem_token(&mut store, &token_id, "source")?;
    if let Value::Object(card) = &mut card {
        card.insert("customer".to_string(), json!(id));
    }

    let entry = live_customer(&mut store, &id)?;
    if !matches!(entry.record.get("default_source"), Some(Value::String(_))) {
        entry
            .record
            .insert("default_source".to_string(), card["id"].clone());
    }
    entry.sources.push(card.clone());
    Ok(Json(card))
}

async fn list_sources(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut store = state.db.write().await;
    let entry = live_customer(&mut store, &id)?;
    Ok(Json(json!({
        "object": "list",
        "url": format!("/v1/customers/{id}/sources"),
        "has_more": false,
        "data": entry.sources,
    })))
}

async fn detach_source(
    State(state): State<AppState>,
    Path((id, card_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let entry = live_customer(&mut store, &id)?;
    let position = entry
        .sources
        .iter()
        .position(|card| card["id"] == card_id.as_str())
        .ok_or_else(|| ApiError::not_found("source", &card_id, "id"))?;
    entry.sources.remove(position);
    if entry.record.get("default_source").and_then(Value::as_str) == Some(card_id.as_str()) {
        let next = entry.sources.first().map_or(Value::Null, |card| card["id"].clone());
        entry.record.insert("default_source".to_string(), next);
    }
    Ok(Json(deleted_stub(&card_id, "card")))
}

// --- charges and refunds ---

async fn create_charge(State(state): State<AppState>, body: String) -> ApiResult {
    let fields = parse_form(&body)?;
    let amount = fields
        .get("amount")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::missing_param("amount"))?;
    if amount < 1 {
        return Err(ApiError::invalid("This value must be greater than or equal to 1.")
            .with("code", "parameter_invalid_integer")
            .with("param", "amount"));
    }
    let currency = str_field(&fields, "currency")
        .ok_or_else(|| ApiError::missing_param("currency"))?
        .to_string();
    let customer_id = str_field(&fields, "customer").map(str::to_string);
    let source_id = str_field(&fields, "source").map(str::to_string);

    let mut store = state.db.write().await;
    let (card, number) = match (&customer_id, &source_id) {
        (Some(customer_id), source_id) => {
            let entry = live_customer(&mut store, customer_id)?;
            let wanted = source_id
                .clone()
                .or_else(|| {
                    entry
                        .record
                        .get("default_source")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .ok_or_else(|| {
                    ApiError::invalid("Cannot charge a customer that has no active card")
                        .with("code", "missing")
                        .with("param", "card")
                })?;
            let card = entry
                .sources
                .iter()
                .find(|card| card["id"] == wanted.as_str())
                .cloned()
                .ok_or_else(|| ApiError::not_found("source", &wanted, "source"))?;
            let number = store.card_numbers.get(&wanted).cloned().unwrap_or_default();
            (card, number)
        }
        (None, Some(token_id)) => redeem_token(&mut store, token_id, "source")?,
        (None, None) => {
            return Err(ApiError::invalid("Must provide source or customer.").with("param", "source"))
        }
    };

    if number == DECLINED_CARD {
        return Err(ApiError::card_error("card_declined", "Your card was declined.")
            .with("decline_code", "generic_decline"));
    }

    let id = new_id("ch");
    let mut charge = Map::new();
    charge.insert("id".to_string(), json!(id));
    charge.insert("object".to_string(), json!("charge"));
    charge.insert("amount".to_string(), json!(amount));
    charge.insert("amount_refunded".to_string(), json!(0));
    charge.insert("balance_transaction".to_string(), json!(new_id("txn")));
    charge.insert("captured".to_string(), json!(true));
    charge.insert("created".to_string(), json!(now()));
    charge.insert("currency".to_string(), json!(currency));
    charge.insert("customer".to_string(), json!(customer_id));
    charge.insert(
        "description".to_string(),
        fields.get("description").cloned().unwrap_or(Value::Null),
    );
    charge.insert("disputed".to_string(), json!(false));
    charge.insert(
        "metadata".to_string(),
        fields.get("metadata").cloned().unwrap_or_else(|| json!({})),
    );
    charge.insert("paid".to_string(), json!(true));
    charge.insert("refunded".to_string(), json!(false));
    charge.insert("source".to_string(), card);
    charge.insert("status".to_string(), json!("succeeded"));
    debug!(%id, amount, "charge created");

    store.charges.insert(id, charge.clone());
    Ok(Json(Value::Object(charge)))
}

async fn create_refund(State(state): State<AppState>, body: String) -> ApiResult {
    let fields = parse_form(&body)?;
    let charge_id = str_field(&fields, "charge")
        .ok_or_else(|| ApiError::missing_param("charge"))?
        .to_string();
    let reason = str_field(&fields, "reason");
    if let Some(reason) = reason {
        if !["duplicate", "fraudulent", "requested_by_customer"].contains(&reason) {
            return Err(ApiError::invalid(format!("Invalid reason: {reason}"))
                .with("code", "parameter_invalid_string")
                .with("param", "reason"));
        }
    }

    let mut store = state.db.write().await;
    let charge = store
        .charges
        .get_mut(&charge_id)
        .ok_or_else(|| ApiError::not_found("charge", &charge_id, "charge"))?;
    let total = charge.get("amount").and_then(Value::as_i64).unwrap_or(0);
    let refunded = charge.get("amount_refunded").and_then(Value::as_i64).unwrap_or(0);
    let remaining = total - refunded;
    if remaining <= 0 {
        return Err(ApiError::invalid(format!("Charge {charge_id} has already been refunded."))
            .with("code", "charge_already_refunded"));
    }

    let amount = match fields.get("amount").and_then(Value::as_i64) {
        None => remaining,
        Some(amount) if amount < 1 => {
            return Err(ApiError::invalid("This value must be greater than or equal to 1.")
                .with("code", "parameter_invalid_integer")
                .with("param", "amount"))
        }
        Some(amount) if amount > remaining => {
            return Err(ApiError::invalid(format!(
                "Refund amount ({amount}) is greater than unrefunded amount on charge ({remaining})"
            ))
            .with("code", "amount_too_large")
            .with("param", "amount"))
        }
        Some(amount) => amount,
    };

    charge.insert("amount_refunded".to_string(), json!(refunded + amount));
    charge.insert("refunded".to_string(), json!(refunded + amount == total));
    let currency = charge.get("currency").cloned().unwrap_or(Value::Null);

    Ok(Json(json!({
        "id": new_id("re"),
        "object": "refund",
        "amount": amount,
        "balance_transaction": new_id("txn"),
        "charge": charge_id,
        "created": now(),
        "currency": currency,
        "metadata": fields.get("metadata").cloned().unwrap_or_else(|| json!({})),
        "payment_intent": fields.get("payment_intent").cloned().unwrap_or(Value::Null),
        "reason": reason,
        "receipt_number": null,
        "source_transfer_reversal": null,
        "status": "succeeded",
        "transfer_reversal": null,
    })))
}
