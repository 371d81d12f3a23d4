use chrono::{DateTime, Utc};

use fleetdesk_auth::{Role, SessionClaims};
use fleetdesk_core::UserId;

/// Verified session for a request (authenticated identity + role).
///
/// Inserted by the session gate; present on every handler behind a matched
/// route when the token verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    email: String,
    role: Role,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            expires_at,
        }
    }
}
