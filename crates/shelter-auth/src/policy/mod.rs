//! Route authorization policy.
//!
//! A static table maps `(method, path pattern)` to the roles allowed to call
//! it. The most specific matching rule decides; paths no rule matches are
//! open to everyone.

pub mod pattern;
pub mod table;

use std::collections::HashSet;

use http::Method;
use tracing::debug;

use shelter_entity::identity::Role;

use crate::context::AuthenticatedContext;

pub use pattern::PathPattern;

/// Who may call a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone, with or without a token.
    Public,
    /// Any authenticated caller.
    Authenticated,
    /// Authenticated callers holding one of these roles.
    Roles(HashSet<Role>),
    /// Nobody.
    DenyAll,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated context (401).
    Unauthenticated,
    /// Authenticated with a role the rule does not allow (403).
    Forbidden,
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed.
    Permit,
    /// The request is rejected.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the request may proceed.
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Method to match; `None` matches every method.
    pub method: Option<Method>,
    /// Path pattern to match.
    pub pattern: PathPattern,
    /// Access granted on a match.
    pub access: RouteAccess,
}

impl RouteRule {
    /// Creates a rule. A role rule with no roles is public.
    pub fn new(method: Option<Method>, pattern: PathPattern, access: RouteAccess) -> Self {
        let access = match access {
            RouteAccess::Roles(roles) if roles.is_empty() => RouteAccess::Public,
            other => other,
        };
        Self {
            method,
            pattern,
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// The immutable route table, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Creates a policy from rules in declaration order.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The rules in declaration order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Finds the most specific rule matching the request.
    ///
    /// Exact-length patterns beat `**` patterns, then more literal segments,
    /// then more segments, then a method-specific rule beats an any-method
    /// rule. Remaining ties go to the earliest rule.
    pub fn find(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        let mut best: Option<(&RouteRule, _)> = None;
        for rule in self.rules.iter().filter(|r| r.matches(method, path)) {
            let key = (rule.pattern.specificity(), rule.method.is_some());
            if best.as_ref().is_none_or(|(_, best_key)| key > *best_key) {
                best = Some((rule, key));
            }
        }
        best.map(|(rule, _)| rule)
    }

    /// Decides whether the request may proceed.
    pub fn authorize(
        &self,
        method: &Method,
        path: &str,
        context: Option<&AuthenticatedContext>,
    ) -> Decision {
        let Some(rule) = self.find(method, path) else {
            return Decision::Permit;
        };

        let decision = match (&rule.access, context) {
            (RouteAccess::Public, _) => Decision::Permit,
            (_, None) => Decision::Deny(DenyReason::Unauthenticated),
            (RouteAccess::Authenticated, Some(_)) => Decision::Permit,
            (RouteAccess::Roles(roles), Some(ctx)) if roles.contains(&ctx.role) => Decision::Permit,
            (RouteAccess::Roles(_), Some(_)) | (RouteAccess::DenyAll, Some(_)) => {
                Decision::Deny(DenyReason::Forbidden)
            }
        };

        debug!(
            method = %method,
            path,
            pattern = %rule.pattern,
            ?decision,
            "Route policy evaluated"
        );
        decision
    }
}
