//! Route access policy.
//!
//! A static table maps `(method, path pattern)` pairs to a [`RoutePolicy`].
//! [`enforce_access_policy`] runs after the security context was attached
//! and short-circuits requests the table does not allow.

use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::extract::{PendingAuthError, SecurityContext};
use crate::handler::ErrorKind;
use crate::handler::message::{ACCESS_DENIED, ALREADY_LOGIN, NOT_LOGGED_IN};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHORIZATION as TRACING_TARGET;

/// Suffix turning a pattern into a prefix match.
const WILDCARD_SUFFIX: &str = "/**";

/// Access requirement of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RoutePolicy {
    /// Only requests with an established identity may pass.
    RequireAuthenticated,
    /// Only anonymous requests may pass.
    RequireAnonymous,
    /// Everyone may pass.
    #[default]
    Open,
}

/// Outcome of checking a request against the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// The route requires an identity and none is present.
    Unauthenticated,
    /// An identity is present but the route does not accept it.
    Forbidden,
}

/// Single row of the policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// `None` matches every method.
    method: Option<Method>,
    pattern: Cow<'static, str>,
    policy: RoutePolicy,
    /// Detail sent when an identity is turned away by this rule.
    denied_detail: Option<&'static str>,
}

impl AccessRule {
    /// Creates a rule for a single method.
    pub fn new(method: Method, pattern: impl Into<Cow<'static, str>>, policy: RoutePolicy) -> Self {
        Self {
            method: Some(method),
            pattern: pattern.into(),
            policy,
            denied_detail: None,
        }
    }

    /// Creates a rule matching every method.
    pub fn any_method(pattern: impl Into<Cow<'static, str>>, policy: RoutePolicy) -> Self {
        Self {
            method: None,
            pattern: pattern.into(),
            policy,
            denied_detail: None,
        }
    }

    /// Sets the detail returned with a `403` from this rule.
    pub fn with_denied_detail(mut self, detail: &'static str) -> Self {
        self.denied_detail = Some(detail);
        self
    }

    /// Returns the `403` detail of this rule, if one was set.
    #[inline]
    pub fn denied_detail(&self) -> Option<&'static str> {
        self.denied_detail
    }

    /// Returns the policy applied by this rule.
    #[inline]
    pub fn policy(&self) -> RoutePolicy {
        self.policy
    }

    /// Returns whether this rule applies to `method` and `path`.
    ///
    /// Patterns ending in `/**` match the prefix itself and everything below it.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        match self.pattern.strip_suffix(WILDCARD_SUFFIX) {
            Some(prefix) => path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            None => self.pattern == path,
        }
    }
}

/// Ordered policy table. The first matching rule wins; unmatched routes
/// are [`RoutePolicy::Open`].
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Arc<Vec<AccessRule>>,
}

impl AccessPolicy {
    /// Creates a policy table from `rules`.
    pub fn new(rules: impl IntoIterator<Item = AccessRule>) -> Self {
        Self {
            rules: Arc::new(rules.into_iter().collect()),
        }
    }

    /// Returns a copy of this table with `rule` appended.
    pub fn with_rule(self, rule: AccessRule) -> Self {
        let mut rules = Arc::unwrap_or_clone(self.rules);
        rules.push(rule);
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Returns the first rule matching `method` and `path`.
    pub fn rule_for(&self, method: &Method, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    /// Returns the policy applied to `method` and `path`.
    pub fn policy_for(&self, method: &Method, path: &str) -> RoutePolicy {
        self.rule_for(method, path)
            .map(AccessRule::policy)
            .unwrap_or_default()
    }

    /// Returns the `403` detail for `method` and `path`.
    ///
    /// Rules without their own detail get a generic access-denied one.
    pub fn denied_detail_for(&self, method: &Method, path: &str) -> &'static str {
        self.rule_for(method, path)
            .and_then(AccessRule::denied_detail)
            .unwrap_or(ACCESS_DENIED)
    }

    /// Checks a request with the given context against the table.
    pub fn decide(&self, method: &Method, path: &str, context: &SecurityContext) -> AccessDecision {
        match (self.policy_for(method, path), context.is_authenticated()) {
            (RoutePolicy::RequireAuthenticated, false) => AccessDecision::Unauthenticated,
            (RoutePolicy::RequireAnonymous, true) => AccessDecision::Forbidden,
            _ => AccessDecision::Allow,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new([
            AccessRule::new(
                Method::POST,
                "/api/v1/articles",
                RoutePolicy::RequireAuthenticated,
            ),
            AccessRule::new(Method::POST, "/api/v1/signup", RoutePolicy::RequireAnonymous)
                .with_denied_detail(ALREADY_LOGIN),
            AccessRule::new(Method::POST, "/api/v1/login", RoutePolicy::RequireAnonymous)
                .with_denied_detail(ALREADY_LOGIN),
        ])
    }
}

/// Enforces the [`AccessPolicy`] on a request.
///
/// Anonymous requests to protected routes get a uniform `401`; whether no
/// token was presented or a presented one was rejected only shows up in
/// the logs.
pub async fn enforce_access_policy(
    State(policy): State<AccessPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let context = SecurityContext::from_extensions(request.extensions());
    let decision = policy.decide(request.method(), request.uri().path(), &context);

    match decision {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Unauthenticated => {
            match request.extensions().get::<PendingAuthError>() {
                Some(PendingAuthError(error)) => tracing::info!(
                    target: TRACING_TARGET,
                    method = %request.method(),
                    path = request.uri().path(),
                    reason = %error.kind(),
                    "credential presented but invalid"
                ),
                None => tracing::info!(
                    target: TRACING_TARGET,
                    method = %request.method(),
                    path = request.uri().path(),
                    "no credential presented"
                ),
            }

            ErrorKind::Unauthorized
                .with_detail(NOT_LOGGED_IN)
                .into_response()
        }
        AccessDecision::Forbidden => {
            tracing::info!(
                target: TRACING_TARGET,
                method = %request.method(),
                path = request.uri().path(),
                "authenticated request to anonymous-only route"
            );

            let detail = policy.denied_detail_for(request.method(), request.uri().path());
            ErrorKind::Forbidden.with_detail(detail).into_response()
        }
    }
}
