//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared services (the record store)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use fleetdesk_auth::{Hs256TokenVerifier, TokenVerifier};

use crate::config::AppConfig;
use crate::middleware::{self, GateConfig};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let secret = config.jwt_secret.unwrap_or_default();
    if secret.is_empty() {
        tracing::warn!("no session secret configured; all protected routes will redirect to sign-in");
    }
    let verifier: Arc<dyn TokenVerifier> = Arc::new(Hs256TokenVerifier::new(secret));

    build_router(verifier, config.gate, Arc::new(services::AppServices::new()))
}

/// Router with explicit collaborators (verifier, gate settings, services).
pub fn build_router(
    verifier: Arc<dyn TokenVerifier>,
    gate: GateConfig,
    services: Arc<services::AppServices>,
) -> Router {
    let gate = Arc::new(gate);
    let gate_state = middleware::GateState {
        verifier,
        config: gate.clone(),
    };

    // The gate sits outermost; routes it does not match pass straight through.
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    gate_state,
                    middleware::session_gate,
                ))
                .layer(Extension(gate))
                .layer(Extension(services)),
        )
}
