//! Request/response DTOs for the JSON surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetdesk_auth::{Capability, Module, Role};
use fleetdesk_core::UserId;

use crate::context::SessionContext;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&SessionContext> for WhoAmI {
    fn from(session: &SessionContext) -> Self {
        Self {
            user_id: session.user_id(),
            email: session.email().to_string(),
            role: session.role(),
            expires_at: session.expires_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PermissionsView {
    pub role: Role,
    pub capabilities: Vec<Capability>,
}

/// Query for `GET /me/permissions/explain`.
///
/// Kept as raw strings so unknown names produce a JSON 400 rather than an
/// extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub module: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub module: Module,
    pub section: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub role: Role,
    pub modules: Vec<ModuleSummary>,
}

#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub page: &'static str,
}
