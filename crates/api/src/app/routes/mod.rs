use axum::{
    routing::{get, post},
    Router,
};

use fleetdesk_auth::Module;

pub mod auth_pages;
pub mod records;
pub mod system;

/// Router for every gated page and endpoint.
pub fn router() -> Router {
    let router = Router::new()
        .route("/", get(system::dashboard))
        .route("/me", get(system::whoami))
        .route("/me/permissions", get(system::permissions))
        .route("/me/permissions/explain", get(system::explain))
        .route("/sign-in", get(auth_pages::sign_in))
        .route("/sign-up", get(auth_pages::sign_up))
        .route("/sign-out", post(auth_pages::sign_out));

    Module::ALL.into_iter().fold(router, |router, module| {
        router.nest(module.section_path(), records::router(module))
    })
}
