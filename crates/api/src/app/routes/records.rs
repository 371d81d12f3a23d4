//! Section endpoints (`/vehicles`, `/drivers`, ...), one router per module.
//!
//! Every handler checks the permission matrix against the session role
//! before touching the store.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use fleetdesk_auth::{Action, Module, authorize};
use fleetdesk_core::{DomainError, RecordId};

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

/// The module a nested section router serves.
#[derive(Debug, Clone, Copy)]
pub struct Section(pub Module);

pub fn router(module: Module) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(fetch).put(update).delete(remove))
        .layer(Extension(Section(module)))
}

fn require(
    session: Option<Extension<SessionContext>>,
    module: Module,
    action: Action,
) -> Result<SessionContext, axum::response::Response> {
    let Some(Extension(session)) = session else {
        return Err(errors::unauthenticated());
    };

    if let Err(e) = authorize(module, action, session.role()) {
        tracing::info!(user_id = %session.user_id(), %e, "request denied");
        return Err(errors::authz_error_to_response(e));
    }

    Ok(session)
}

fn parse_id(raw: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

/// Bodies are read raw and parsed only after the caller is authorized.
fn parse_body(body: &Bytes) -> Result<Value, axum::response::Response> {
    serde_json::from_slice(body).map_err(|e| {
        errors::domain_error_to_response(DomainError::validation(format!(
            "record body is not valid JSON: {e}"
        )))
    })
}

/// GET /<section>
pub async fn list(
    Extension(Section(module)): Extension<Section>,
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
) -> axum::response::Response {
    if let Err(resp) = require(session, module, Action::View) {
        return resp;
    }

    let records = services.records.list(module);
    Json(serde_json::json!({ "module": module, "records": records })).into_response()
}

/// POST /<section>
pub async fn create(
    Extension(Section(module)): Extension<Section>,
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
    body: Bytes,
) -> axum::response::Response {
    let session = match require(session, module, Action::Create) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services
        .records
        .create(module, body, session.user_id(), Utc::now())
    {
        Ok(record) => {
            tracing::info!(%module, record_id = %record.id, "record created");
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /<section>/:id
pub async fn fetch(
    Extension(Section(module)): Extension<Section>,
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(session, module, Action::View) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.records.get(module, id) {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PUT /<section>/:id
pub async fn update(
    Extension(Section(module)): Extension<Section>,
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
    Path(id): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    if let Err(resp) = require(session, module, Action::Edit) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services.records.update(module, id, body, Utc::now()) {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// DELETE /<section>/:id
pub async fn remove(
    Extension(Section(module)): Extension<Section>,
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(session, module, Action::Delete) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.records.delete(module, id) {
        Ok(record) => {
            tracing::info!(%module, record_id = %record.id, "record deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
