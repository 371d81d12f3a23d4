use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use fleetdesk_auth::{Action, Module, PermissionMatrix, has_permission};

use crate::app::dto::{Dashboard, ExplainQuery, ModuleSummary, PermissionsView, WhoAmI};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET / - record counts for every module the caller may view
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<Extension<SessionContext>>,
) -> axum::response::Response {
    let Some(Extension(session)) = session else {
        return errors::unauthenticated();
    };

    let modules = Module::ALL
        .into_iter()
        .filter(|m| has_permission(*m, Action::View, session.role()))
        .map(|module| ModuleSummary {
            module,
            section: module.section_path(),
            count: services.records.count(module),
        })
        .collect();

    Json(Dashboard {
        role: session.role(),
        modules,
    })
    .into_response()
}

pub async fn whoami(session: Option<Extension<SessionContext>>) -> axum::response::Response {
    match session {
        Some(Extension(session)) => Json(WhoAmI::from(&session)).into_response(),
        None => errors::unauthenticated(),
    }
}

/// GET /me/permissions - what the caller's role may do, per module
pub async fn permissions(session: Option<Extension<SessionContext>>) -> axum::response::Response {
    let Some(Extension(session)) = session else {
        return errors::unauthenticated();
    };

    Json(PermissionsView {
        role: session.role(),
        capabilities: PermissionMatrix::global().capabilities(session.role()),
    })
    .into_response()
}

/// GET /me/permissions/explain?module=..&action=.. - why a check passes or fails
pub async fn explain(
    session: Option<Extension<SessionContext>>,
    Query(query): Query<ExplainQuery>,
) -> axum::response::Response {
    let Some(Extension(session)) = session else {
        return errors::unauthenticated();
    };

    let module: Module = match query.module.parse() {
        Ok(m) => m,
        Err(e) => return errors::parse_error_to_response(e),
    };
    let action: Action = match query.action.parse() {
        Ok(a) => a,
        Err(e) => return errors::parse_error_to_response(e),
    };

    Json(PermissionMatrix::global().explain(module, action, session.role())).into_response()
}
