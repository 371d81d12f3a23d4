//! Sign-in / sign-up pages and sign-out.
//!
//! Credential checks and token issuance belong to the identity provider; these
//! handlers only exist so the gate has somewhere to send people.

use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::dto::AuthPage;
use crate::context::SessionContext;
use crate::middleware::{clear_session_cookie, GateConfig};

pub async fn sign_in() -> Json<AuthPage> {
    Json(AuthPage { page: "sign-in" })
}

pub async fn sign_up() -> Json<AuthPage> {
    Json(AuthPage { page: "sign-up" })
}

/// POST /sign-out - drop the session cookie and return to sign-in
pub async fn sign_out(
    Extension(gate): Extension<Arc<GateConfig>>,
    session: Option<Extension<SessionContext>>,
    jar: CookieJar,
) -> axum::response::Response {
    if let Some(Extension(session)) = session {
        tracing::info!(user_id = %session.user_id(), "signed out");
    }

    (
        clear_session_cookie(jar, &gate.cookie_name),
        Redirect::to(&gate.sign_in_path),
    )
        .into_response()
}
