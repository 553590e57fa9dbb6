//! API module
//!
//! HTTP presentation adapter over the ledger: shared state, router and
//! middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{extract::State, middleware as axum_middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::handlers::{BeneficiaryValidator, SignupHandler, TransferEngine};
use crate::ledger::{Ledger, LedgerStats};
use crate::session::SessionStore;

pub use routes::{protected_routes, public_routes};

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<Ledger>,
    pub sessions: Arc<SessionStore>,
    pub signup: Arc<SignupHandler>,
    pub transfers: Arc<TransferEngine>,
    pub beneficiaries: Arc<BeneficiaryValidator>,
}

impl AppState {
    pub fn new(config: Config, ledger: Arc<Ledger>, sessions: Arc<SessionStore>) -> Self {
        Self {
            config: Arc::new(config),
            signup: Arc::new(SignupHandler::new(Arc::clone(&ledger))),
            transfers: Arc::new(TransferEngine::new(Arc::clone(&ledger))),
            beneficiaries: Arc::new(BeneficiaryValidator::new()),
            ledger,
            sessions,
        }
    }

    /// Replace the beneficiary validator (tests pin its acceptance rate)
    pub fn with_beneficiaries(mut self, validator: BeneficiaryValidator) -> Self {
        self.beneficiaries = Arc::new(validator);
        self
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Layers run last-added first:
    // context -> logging -> latency -> session -> handler
    let protected = protected_routes().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::session_middleware,
    ));

    let api = public_routes()
        .merge(protected)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::latency_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    // Browser frontends run on another origin during development
    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    ledger: LedgerStats,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ledger: state.ledger.stats(),
    })
}
