use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fleetdesk_auth::{AuthzError, ParseError};
use fleetdesk_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn parse_error_to_response(err: ParseError) -> axum::response::Response {
    let code = match err {
        ParseError::UnknownModule(_) => "invalid_module",
        ParseError::UnknownAction(_) => "invalid_action",
        ParseError::UnknownRole(_) => "invalid_role",
    };
    json_error(StatusCode::BAD_REQUEST, code, err.to_string())
}

pub fn unauthenticated() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no verified session")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
