//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountNumber, AccountView, DomainError, OperationContext, Transaction, TransactionKind,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{BeneficiaryCheck, SignupCommand, TransferCommand};
use crate::ledger::DEFAULT_HISTORY_LIMIT;
use crate::session::SessionStatus;

use super::middleware::{bearer_token, Actor};
use super::AppState;

/// Largest page size accepted by the history endpoint
const MAX_HISTORY_LIMIT: usize = 100;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AccountView,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub balance: Decimal,
    pub account_number: AccountNumber,
    pub message: String,
}

/// Transaction as shown to the account owner
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub beneficiary: String,
    pub description: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id().reference(),
            date: txn.date(),
            amount: txn.amount(),
            kind: txn.kind(),
            beneficiary: txn.beneficiary().to_string(),
            description: txn.description().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub success: bool,
    pub transactions: Vec<TransactionResponse>,
    pub balance: Decimal,
    pub account_number: AccountNumber,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub transactions: Vec<TransactionResponse>,
    pub total: usize,
    pub has_more: bool,
    pub message: String,
}

/// Amount as typed into a form (`"1500"`) or sent as a JSON number (`1500`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    fn into_text(self) -> String {
        match self {
            AmountInput::Text(text) => text,
            AmountInput::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub beneficiary: String,
    pub amount: AmountInput,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
    pub new_balance: Decimal,
    pub transaction_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BeneficiaryRequest {
    pub account_number: String,
}

#[derive(Debug, Serialize)]
pub struct AccountsListResponse {
    pub accounts: Vec<AccountView>,
    pub total: usize,
}

// =========================================================================
// API Router
// =========================================================================

/// Routes that need no session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/session", get(session))
        .route("/beneficiaries/validate", post(validate_beneficiary))
}

/// Routes that act on behalf of the session's account
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/account", get(get_account))
        .route("/transactions", get(get_transactions))
        .route("/transactions/history", get(get_transaction_history))
        .route("/transfers", post(transfer))
        .route("/admin/accounts", get(list_accounts))
}

fn require_actor(actor: Option<Extension<Actor>>) -> AppResult<Actor> {
    actor
        .map(|Extension(actor)| actor)
        .ok_or(AppError::Domain(DomainError::ActorNotFound))
}

// =========================================================================
// POST /auth/signup
// =========================================================================

/// Open an account and start a session for it
async fn signup(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let command = SignupCommand::new(
        request.username.trim().to_string(),
        request.email.trim().to_string(),
        request.password,
    );
    let user = state.signup.execute(command, &context)?;
    let session = state.sessions.issue(user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully".to_string(),
            token: session.token,
            user,
        }),
    ))
}

// =========================================================================
// POST /auth/login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .ledger
        .authenticate(request.email.trim(), &request.password)
        .ok_or_else(|| {
            tracing::info!(correlation_id = ?context.correlation_id, "Login rejected");
            AppError::InvalidCredentials
        })?;
    let session = state.sessions.issue(user.id);

    tracing::info!(
        account_id = %user.id,
        correlation_id = ?context.correlation_id,
        "Login succeeded"
    );

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token: session.token,
        user,
    }))
}

// =========================================================================
// POST /auth/logout
// =========================================================================

async fn logout(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> AppResult<Json<MessageResponse>> {
    let actor = require_actor(actor)?;
    state.sessions.revoke(&actor.token);

    tracing::info!(account_id = %actor.account_id, "Logged out");

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    }))
}

// =========================================================================
// GET /auth/session
// =========================================================================

/// Report whether the bearer token belongs to a live session
async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let resolved = bearer_token(&headers).and_then(|token| match state.sessions.validate(token) {
        SessionStatus::Valid(session) => state
            .ledger
            .get_account(session.account_id)
            .map(|account| (account.view(), session.expires_at(state.sessions.ttl()))),
        SessionStatus::Expired | SessionStatus::Missing => None,
    });

    Json(match resolved {
        Some((user, expires_at)) => SessionResponse {
            authenticated: true,
            user: Some(user),
            expires_at: Some(expires_at),
        },
        None => SessionResponse {
            authenticated: false,
            user: None,
            expires_at: None,
        },
    })
}

// =========================================================================
// GET /account
// =========================================================================

async fn get_account(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> AppResult<Json<BalanceResponse>> {
    let actor = require_actor(actor)?;
    let account = state
        .ledger
        .get_account(actor.account_id)
        .ok_or(DomainError::ActorNotFound)?;

    Ok(Json(BalanceResponse {
        success: true,
        balance: account.balance().value(),
        account_number: account.account_number().clone(),
        message: "Balance fetched successfully".to_string(),
    }))
}

// =========================================================================
// GET /transactions
// =========================================================================

async fn get_transactions(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> AppResult<Json<TransactionsResponse>> {
    let actor = require_actor(actor)?;
    let summary = state
        .ledger
        .account_summary(actor.account_id)
        .map_err(actor_gone)?;

    Ok(Json(TransactionsResponse {
        success: true,
        transactions: summary.transactions.iter().map(TransactionResponse::from).collect(),
        balance: summary.balance,
        account_number: summary.account_number,
        message: "Transactions fetched successfully".to_string(),
    }))
}

// =========================================================================
// GET /transactions/history
// =========================================================================

async fn get_transaction_history(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let actor = require_actor(actor)?;
    if query.limit == 0 || query.limit > MAX_HISTORY_LIMIT {
        return Err(AppError::InvalidRequest(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let page = state
        .ledger
        .history_page(actor.account_id, query.limit, query.offset)
        .map_err(actor_gone)?;

    Ok(Json(HistoryResponse {
        success: true,
        transactions: page.transactions.iter().map(TransactionResponse::from).collect(),
        total: page.total,
        has_more: page.has_more,
        message: "Transaction history fetched successfully".to_string(),
    }))
}

// =========================================================================
// POST /transfers
// =========================================================================

async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    actor: Option<Extension<Actor>>,
    Json(request): Json<TransferRequest>,
) -> AppResult<Json<TransferResponse>> {
    let source = actor.map(|Extension(actor)| actor.account_id);

    let mut command = TransferCommand::new(source, request.beneficiary, request.amount.into_text());
    if let Some(remarks) = request.remarks {
        command = command.with_remarks(remarks);
    }

    let receipt = state.transfers.execute(command, &context)?;

    Ok(Json(TransferResponse {
        success: true,
        message: receipt.message,
        new_balance: receipt.new_balance,
        transaction_id: receipt.reference,
    }))
}

// =========================================================================
// POST /beneficiaries/validate
// =========================================================================

/// Advisory lookup; never consulted by the transfer endpoint
async fn validate_beneficiary(
    State(state): State<AppState>,
    Json(request): Json<BeneficiaryRequest>,
) -> Json<BeneficiaryCheck> {
    Json(state.beneficiaries.validate(&request.account_number))
}

// =========================================================================
// GET /admin/accounts
// =========================================================================

async fn list_accounts(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> AppResult<Json<AccountsListResponse>> {
    require_actor(actor)?;
    let accounts = state.ledger.list_accounts();

    Ok(Json(AccountsListResponse {
        total: accounts.len(),
        accounts,
    }))
}

/// The session resolved to an account that no longer exists
fn actor_gone(err: DomainError) -> AppError {
    match err {
        DomainError::AccountNotFound(_) => AppError::Domain(DomainError::ActorNotFound),
        other => AppError::Domain(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_input_accepts_text_and_numbers() {
        let request: TransferRequest =
            serde_json::from_str(r#"{"beneficiary":"AN9876543210","amount":1500.5}"#).unwrap();
        assert_eq!(request.amount.into_text(), "1500.5");

        let request: TransferRequest = serde_json::from_str(
            r#"{"beneficiary":"AN9876543210","amount":"1500","remarks":"Rent"}"#,
        )
        .unwrap();
        assert_eq!(request.amount.into_text(), "1500");
        assert_eq!(request.remarks.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_history_query_defaults() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_actor_gone_maps_missing_account() {
        let err = actor_gone(DomainError::account_not_found("x"));
        assert!(matches!(err, AppError::Domain(DomainError::ActorNotFound)));
    }
}
