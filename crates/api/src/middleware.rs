//! Session gate: decides, per request, whether to admit or redirect.
//!
//! The decision itself is [`decide`], a pure function of the path, the
//! session cookie value, a verifier and a clock. [`session_gate`] only maps
//! decisions onto axum responses.

use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Utc};

use fleetdesk_auth::{Module, SessionClaims, TokenVerdict, TokenVerifier};

use crate::context::SessionContext;

pub const DEFAULT_SESSION_COOKIE: &str = "session";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";
pub const ROOT_PATH: &str = "/";

/// One protected-route pattern.
///
/// `/trips/:path*` covers `/trips` and everything below it; any other pattern
/// matches only the exact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Section(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/:path*") {
            Some(prefix) => RoutePattern::Section(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(p) => path == p,
            RoutePattern::Section(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// The set of paths the gate intercepts. Anything else passes untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatcher {
    patterns: Vec<RoutePattern>,
}

impl RouteMatcher {
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| RoutePattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Gate configuration: cookie name, fixed redirect targets, protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub cookie_name: String,
    pub sign_in_path: String,
    pub sign_up_path: String,
    pub root_path: String,
    pub protected: RouteMatcher,
}

impl Default for GateConfig {
    fn default() -> Self {
        let mut patterns = vec![
            ROOT_PATH.to_string(),
            SIGN_IN_PATH.to_string(),
            SIGN_UP_PATH.to_string(),
            "/sign-out".to_string(),
            "/me/:path*".to_string(),
        ];
        patterns.extend(Module::ALL.iter().map(|m| format!("{}/:path*", m.section_path())));

        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            sign_in_path: SIGN_IN_PATH.to_string(),
            sign_up_path: SIGN_UP_PATH.to_string(),
            root_path: ROOT_PATH.to_string(),
            protected: RouteMatcher::from_patterns(patterns),
        }
    }
}

impl GateConfig {
    /// Exact comparison; `/sign-in/help` is not an auth page.
    pub fn is_auth_page(&self, path: &str) -> bool {
        path == self.sign_in_path || path == self.sign_up_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Path is outside the protected set.
    NotProtected,
    /// Continue to the handler; claims are present when a session was verified.
    Allow(Option<SessionClaims>),
    RedirectToRoot,
    RedirectToSignIn { clear_cookie: bool },
}

/// Decide what happens to a request.
///
/// On an auth page, cookie presence alone bounces the caller to the root; the
/// token is only verified for the rest of the protected surface.
pub fn decide(
    path: &str,
    token: Option<&str>,
    verifier: &dyn TokenVerifier,
    now: DateTime<Utc>,
    config: &GateConfig,
) -> GateDecision {
    if !config.protected.matches(path) {
        return GateDecision::NotProtected;
    }

    let auth_page = config.is_auth_page(path);

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return if auth_page {
            GateDecision::Allow(None)
        } else {
            GateDecision::RedirectToSignIn { clear_cookie: false }
        };
    };

    if auth_page {
        return GateDecision::RedirectToRoot;
    }

    match verifier.verify(token, now) {
        TokenVerdict::Valid(claims) => GateDecision::Allow(Some(claims)),
        TokenVerdict::Invalid(reason) => {
            tracing::info!(path, %reason, "invalid session; redirecting to sign-in");
            GateDecision::RedirectToSignIn { clear_cookie: true }
        }
    }
}

#[derive(Clone)]
pub struct GateState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: Arc<GateConfig>,
}

pub async fn session_gate(
    State(state): State<GateState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(&state.config.cookie_name)
        .map(|c| c.value().to_string());

    let decision = decide(
        &path,
        token.as_deref(),
        state.verifier.as_ref(),
        Utc::now(),
        &state.config,
    );
    tracing::debug!(path = %path, ?decision, "session gate");

    match decision {
        GateDecision::NotProtected | GateDecision::Allow(None) => next.run(req).await,
        GateDecision::Allow(Some(claims)) => {
            req.extensions_mut().insert(SessionContext::from(claims));
            next.run(req).await
        }
        GateDecision::RedirectToRoot => Redirect::temporary(&state.config.root_path).into_response(),
        GateDecision::RedirectToSignIn { clear_cookie: false } => {
            Redirect::temporary(&state.config.sign_in_path).into_response()
        }
        GateDecision::RedirectToSignIn { clear_cookie: true } => (
            clear_session_cookie(jar, &state.config.cookie_name),
            Redirect::temporary(&state.config.sign_in_path),
        )
            .into_response(),
    }
}

/// Add an immediately-expiring (`Max-Age=0`) session cookie to the jar.
pub fn clear_session_cookie(jar: CookieJar, cookie_name: &str) -> CookieJar {
    let mut cookie = Cookie::build((cookie_name.to_string(), "")).path("/").build();
    cookie.make_removal();
    jar.add(cookie)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;
    use fleetdesk_auth::{InvalidReason, Role};
    use fleetdesk_core::UserId;

    use super::*;

    /// Verifier returning a fixed verdict and counting calls.
    struct FixedVerifier {
        verdict: TokenVerdict,
        calls: AtomicUsize,
    }

    impl FixedVerifier {
        fn new(verdict: TokenVerdict) -> Self {
            Self {
                verdict,
                calls: AtomicUsize::new(0),
            }
        }

        fn valid() -> Self {
            let claims = SessionClaims::new(
                UserId::new(),
                "fleet@ops.test",
                Role::Editor,
                Utc::now(),
                Duration::hours(1),
            );
            Self::new(TokenVerdict::Valid(claims))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenVerifier for FixedVerifier {
        fn verify(&self, _token: &str, _now: DateTime<Utc>) -> TokenVerdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict.clone()
        }
    }

    fn run(path: &str, token: Option<&str>, verifier: &FixedVerifier) -> GateDecision {
        decide(path, token, verifier, Utc::now(), &GateConfig::default())
    }

    #[test]
    fn sign_in_without_cookie_is_allowed() {
        let v = FixedVerifier::valid();
        assert_eq!(run("/sign-in", None, &v), GateDecision::Allow(None));
        assert_eq!(run("/sign-up", None, &v), GateDecision::Allow(None));
        assert_eq!(v.calls(), 0);
    }

    #[test]
    fn protected_path_without_cookie_redirects_to_sign_in() {
        let v = FixedVerifier::valid();
        for path in ["/", "/vehicles", "/trips/42/edit", "/me"] {
            assert_eq!(
                run(path, None, &v),
                GateDecision::RedirectToSignIn { clear_cookie: false },
                "{path}"
            );
        }
    }

    #[test]
    fn cookie_on_auth_page_bounces_to_root_before_verification() {
        let v = FixedVerifier::new(TokenVerdict::Invalid(InvalidReason::Malformed));
        assert_eq!(run("/sign-in", Some("garbled"), &v), GateDecision::RedirectToRoot);
        assert_eq!(run("/sign-up", Some("garbled"), &v), GateDecision::RedirectToRoot);
        assert_eq!(v.calls(), 0);
    }

    #[test]
    fn invalid_token_redirects_and_clears_cookie() {
        for reason in [
            InvalidReason::Expired,
            InvalidReason::BadSignature,
            InvalidReason::Malformed,
            InvalidReason::MissingSecret,
        ] {
            let v = FixedVerifier::new(TokenVerdict::Invalid(reason));
            assert_eq!(
                run("/", Some("tok"), &v),
                GateDecision::RedirectToSignIn { clear_cookie: true }
            );
            assert_eq!(v.calls(), 1);
        }
    }

    #[test]
    fn valid_token_is_admitted_with_claims() {
        let v = FixedVerifier::valid();
        let TokenVerdict::Valid(expected) = v.verdict.clone() else {
            unreachable!()
        };
        assert_eq!(
            run("/expenses/3", Some("tok"), &v),
            GateDecision::Allow(Some(expected))
        );
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let v = FixedVerifier::valid();
        assert_eq!(run("/sign-in", Some(""), &v), GateDecision::Allow(None));
        assert_eq!(
            run("/drivers", Some(""), &v),
            GateDecision::RedirectToSignIn { clear_cookie: false }
        );
    }

    #[test]
    fn unmatched_paths_are_not_intercepted() {
        let v = FixedVerifier::valid();
        assert_eq!(run("/health", None, &v), GateDecision::NotProtected);
        assert_eq!(run("/vehiclesX", None, &v), GateDecision::NotProtected);
        assert_eq!(run("/sign-in/help", Some("tok"), &v), GateDecision::NotProtected);
        assert_eq!(v.calls(), 0);
    }

    #[test]
    fn auth_page_check_is_exact_even_when_route_is_protected() {
        let config = GateConfig {
            protected: RouteMatcher::from_patterns(["/sign-in/:path*"]),
            ..GateConfig::default()
        };
        let v = FixedVerifier::valid();
        let decision = decide("/sign-in/help", None, &v, Utc::now(), &config);
        assert_eq!(decision, GateDecision::RedirectToSignIn { clear_cookie: false });
    }

    #[test]
    fn section_pattern_matching() {
        let p = RoutePattern::parse("/customers/:path*");
        assert_eq!(p, RoutePattern::Section("/customers".to_string()));
        assert!(p.matches("/customers"));
        assert!(p.matches("/customers/"));
        assert!(p.matches("/customers/abc/edit"));
        assert!(!p.matches("/customersabc"));
        assert!(!p.matches("/"));

        let root = RoutePattern::parse("/");
        assert!(root.matches("/"));
        assert!(!root.matches("/anything"));
    }

    #[test]
    fn clearing_sets_max_age_zero() {
        let jar = clear_session_cookie(CookieJar::new(), "session");
        let cookie = jar.get("session").unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age().map(|d| d.whole_seconds()), Some(0));
        assert_eq!(cookie.path(), Some("/"));
    }
}
