//! Common test utilities
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use arthanidhi_ledger::api::{build_router, AppState};
use arthanidhi_ledger::domain::{Account, AccountId, AccountProfile, Amount, Transaction};
use arthanidhi_ledger::handlers::BeneficiaryValidator;
use arthanidhi_ledger::session::SessionStore;
use arthanidhi_ledger::{Config, Ledger};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::util::ServiceExt;

/// Fresh ledger seeding new accounts with `opening_units`
pub fn ledger_with_opening(opening_units: i64) -> Arc<Ledger> {
    Arc::new(Ledger::with_opening_balance(
        Amount::from_units(opening_units).expect("positive opening balance"),
    ))
}

pub fn open_account(ledger: &Ledger, email: &str) -> Account {
    ledger
        .create_account(AccountProfile::new("tester", email, "secret1"))
        .expect("Failed to open account")
}

/// Sum of the ledger entries owned by `id`
pub fn ledger_sum(ledger: &Ledger, id: AccountId) -> Decimal {
    ledger
        .list_for_account(id)
        .iter()
        .map(Transaction::amount)
        .sum()
}

pub fn balance_of(ledger: &Ledger, id: AccountId) -> Decimal {
    ledger
        .get_account(id)
        .expect("account exists")
        .balance()
        .value()
}

/// Router over a fresh ledger without demo data
pub fn test_app() -> (Router, AppState) {
    test_app_with_session_ttl(Config::default().session_ttl())
}

/// Router whose sessions live for `ttl`; zero expires them on issue
pub fn test_app_with_session_ttl(ttl: chrono::Duration) -> (Router, AppState) {
    let config = Config {
        seed_demo_data: false,
        ..Config::default()
    };
    let ledger = Arc::new(Ledger::with_opening_balance(config.opening_balance));
    let sessions = Arc::new(SessionStore::new(ttl));
    let state = AppState::new(config, ledger, sessions)
        .with_beneficiaries(BeneficiaryValidator::with_acceptance_rate(0.0));

    (build_router(state.clone()), state)
}

/// Send a JSON request and decode the JSON response
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Sign up through the API and return the session token
pub async fn signup(app: &Router, username: &str, email: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/auth/signup",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", json);

    json["token"].as_str().expect("token in response").to_string()
}

/// Decimal fields serialize as strings
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}
