use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_key, DEFAULT_API_KEY};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_API_KEY}"))
}

fn form_request(method: &str, uri: &str, body: &str) -> Request<String> {
    authed(method, uri)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    authed(method, uri).body(String::new()).unwrap()
}

/// Sends one request through a shared router and returns status and JSON.
async fn send(app: &axum::Router, request: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

// --- auth ---

#[tokio::test]
async fn missing_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/customers/cus_1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn wrong_key_returns_401() {
    let resp = app_with_key("sk_test_other")
        .oneshot(empty_request("GET", "/v1/customers/cus_1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- customers ---

#[tokio::test]
async fn create_customer_rebuilds_nested_fields() {
    let resp = app()
        .oneshot(form_request(
            "POST",
            "/v1/customers",
            "name=Test&balance=0&preferred_locales%5B0%5D=en-US&metadata%5Bfoo%5D=bar",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["id"].as_str().unwrap().starts_with("cus_"));
    assert_eq!(body["object"], "customer");
    assert_eq!(body["name"], "Test");
    assert_eq!(body["balance"], 0);
    assert_eq!(body["metadata"]["foo"], "bar");
    assert_eq!(body["preferred_locales"][0], "en-US");
}

#[tokio::test]
async fn get_unknown_customer_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/customers/cus_missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "resource_missing");
    assert_eq!(body["error"]["message"], "No such customer: 'cus_missing'");
}

#[tokio::test]
async fn customer_lifecycle() {
    let app = app();

    let (status, created) = send(&app, form_request("POST", "/v1/customers", "name=Before")).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        form_request("POST", &format!("/v1/customers/{id}"), "name=After&email=a%40b.c"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "After");
    assert_eq!(updated["email"], "a@b.c");

    let (status, deleted) = send(&app, empty_request("DELETE", &format!("/v1/customers/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    // A deleted customer still resolves, but only as a stub.
    let (status, fetched) = send(&app, empty_request("GET", &format!("/v1/customers/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["deleted"], true);
    assert!(fetched.get("name").is_none());

    let (status, _) = send(&app, empty_request("DELETE", &format!("/v1/customers/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- tokens and sources ---

#[tokio::test]
async fn token_without_number_is_rejected() {
    let resp = app()
        .oneshot(form_request(
            "POST",
            "/v1/tokens",
            "card%5Bexp_month%5D=0&card%5Bexp_year%5D=0",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Missing required param: card[number].");
    assert_eq!(body["error"]["param"], "card[number]");
}

#[tokio::test]
async fn token_with_non_digit_number_is_rejected() {
    let app = app();

    for number in ["%E2%82%AC%E2%82%AC", "4242-4242"] {
        let body = format!("card%5Bexp_month%5D=11&card%5Bexp_year%5D=2030&card%5Bnumber%5D={number}");
        let (status, body) = send(&app, form_request("POST", "/v1/tokens", &body)).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"]["code"], "invalid_number");
        assert_eq!(body["error"]["param"], "number");
    }

    // The server keeps answering afterwards.
    let (status, _) = send(&app, empty_request("GET", "/v1/customers/cus_missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_cycle() {
    let app = app();

    let (_, customer) = send(&app, form_request("POST", "/v1/customers", "name=Cards")).await;
    let id = customer["id"].as_str().unwrap().to_string();

    let (status, token) = send(
        &app,
        form_request(
            "POST",
            "/v1/tokens",
            "card%5Bexp_month%5D=11&card%5Bexp_year%5D=2030&card%5Bnumber%5D=4242424242424242",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["card"]["last4"], "4242");
    let token_id = token["id"].as_str().unwrap().to_string();

    let sources = format!("/v1/customers/{id}/sources");
    let (status, card) = send(&app, form_request("POST", &sources, &format!("source={token_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["customer"], id.as_str());
    let card_id = card["id"].as_str().unwrap().to_string();

    // Tokens are single use.
    let (status, body) = send(&app, form_request("POST", &sources, &format!("source={token_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "token_already_used");

    let (_, list) = send(&app, empty_request("GET", &sources)).await;
    assert_eq!(list["object"], "list");
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert_eq!(list["data"][0]["id"], card_id.as_str());

    let (status, _) = send(&app, empty_request("DELETE", &format!("{sources}/{card_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, empty_request("GET", &sources)).await;
    assert!(list["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, empty_request("DELETE", &format!("{sources}/{card_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- charges and refunds ---

async fn token(app: &axum::Router, number: &str) -> String {
    let body = format!("card%5Bexp_month%5D=11&card%5Bexp_year%5D=2030&card%5Bnumber%5D={number}");
    let (_, token) = send(app, form_request("POST", "/v1/tokens", &body)).await;
    token["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn charge_and_refund() {
    let app = app();
    let token_id = token(&app, "4242424242424242").await;

    let (status, charge) = send(
        &app,
        form_request("POST", "/v1/charges", &format!("amount=500&currency=usd&source={token_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(charge["amount"], 500);
    assert_eq!(charge["paid"], true);
    assert_eq!(charge["source"]["object"], "card");
    let charge_id = charge["id"].as_str().unwrap().to_string();

    let (status, refund) = send(
        &app,
        form_request("POST", "/v1/refunds", &format!("charge={charge_id}&amount=200")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refund["amount"], 200);
    assert_eq!(refund["status"], "succeeded");

    let (status, body) = send(
        &app,
        form_request("POST", "/v1/refunds", &format!("charge={charge_id}&amount=400")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "amount_too_large");
}

#[tokio::test]
async fn declined_card_returns_402() {
    let app = app();
    let token_id = token(&app, "4000000000000002").await;

    let (status, body) = send(
        &app,
        form_request("POST", "/v1/charges", &format!("amount=500&currency=usd&source={token_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"]["code"], "card_declined");
    assert_eq!(body["error"]["decline_code"], "generic_decline");
}

#[tokio::test]
async fn charge_requires_amount() {
    let resp = app()
        .oneshot(form_request("POST", "/v1/charges", "currency=usd"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["param"], "amount");
}

#[tokio::test]
async fn refund_of_unknown_charge_returns_404() {
    let resp = app()
        .oneshot(form_request("POST", "/v1/refunds", "charge=ch_missing&amount=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
