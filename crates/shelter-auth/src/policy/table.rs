//! Building the route table, from configuration or the built-in defaults.

use std::collections::HashSet;
use std::str::FromStr;

use http::Method;

use shelter_core::config::RouteRuleConfig;
use shelter_entity::identity::Role;

use super::{PathPattern, RouteAccess, RouteRule, RoutePolicy};
use crate::error::AuthError;

use shelter_entity::identity::Role::{Admin as A, Ong as O, User as U};

const PUBLIC: &[&str] = &[
    "/auth/signin",
    "/auth/refresh",
    "/health",
    "/v3/api-docs/**",
    "/swagger-ui/**",
    "/swagger-ui.html",
    "/webjars/**",
];

const DENY_ALL: &[&str] = &["/usuarios", "/ongs"];

const ROLE_RULES: &[(Option<&str>, &str, &[Role])] = &[
    (None, "/api/v1/administradores/**", &[A]),
    // usuarios
    (Some("GET"), "/api/v1/usuarios", &[A]),
    (Some("GET"), "/api/v1/usuarios/{nomeUsuario}", &[U, A]),
    (Some("GET"), "/api/v1/usuarios/id/{id}", &[A]),
    (Some("GET"), "/api/v1/usuarios/{id}/adocoes", &[U, A]),
    (Some("PUT"), "/api/v1/usuarios/{nomeUsuario}", &[U, A]),
    (Some("PATCH"), "/api/v1/usuarios/{nomeUsuario}", &[U, A]),
    (Some("DELETE"), "/api/v1/usuarios/{nomeUsuario}", &[U, A]),
    // ongs
    (Some("GET"), "/api/v1/ongs", &[A, U, O]),
    (Some("GET"), "/api/v1/ongs/{nomeUsuario}", &[A, O, U]),
    (Some("GET"), "/api/v1/ongs/id/{id}", &[A, O]),
    (Some("GET"), "/api/v1/ongs/{id}/adocoes", &[A, O]),
    (Some("GET"), "/api/v1/ongs/{nomeUsuario}/animais", &[A, O, U]),
    (Some("PUT"), "/api/v1/ongs/{nomeUsuario}", &[A, O]),
    (Some("PATCH"), "/api/v1/ongs/{nomeUsuario}", &[A, O]),
    (Some("DELETE"), "/api/v1/ongs/{nomeUsuario}", &[A, O]),
    // animais
    (Some("GET"), "/api/v1/animais", &[A, O, U]),
    (Some("GET"), "/api/v1/animais/id/{id}", &[A]),
    (Some("GET"), "/api/v1/animais/{nome}", &[A, O, U]),
    (Some("POST"), "/api/v1/animais/registro", &[A, O]),
    (Some("PUT"), "/api/v1/animais/{nome}", &[A, O]),
    (Some("PATCH"), "/api/v1/animais/{nome}", &[A, O]),
    (Some("DELETE"), "/api/v1/animais/{nome}", &[A, O]),
    // adocoes
    (Some("GET"), "/api/v1/adocoes", &[A]),
    (Some("GET"), "/api/v1/adocoes/{id}", &[A, O, U]),
    (Some("POST"), "/api/v1/adocoes/registro", &[A, O]),
    (Some("PUT"), "/api/v1/adocoes/{id}", &[A, O]),
    (Some("PATCH"), "/api/v1/adocoes/{id}", &[A, O]),
    (Some("DELETE"), "/api/v1/adocoes/{id}", &[A, O]),
];

const AUTHENTICATED: &[&str] = &["/auth/me", "/auth/credentials"];

impl RoutePolicy {
    /// The built-in route table for the adoption API.
    ///
    /// Anything not listed stays open.
    pub fn default_table() -> Result<Self, AuthError> {
        let mut rules = Vec::new();
        for pattern in PUBLIC {
            rules.push(RouteRule::new(None, pattern.parse()?, RouteAccess::Public));
        }
        for pattern in AUTHENTICATED {
            rules.push(RouteRule::new(
                None,
                pattern.parse()?,
                RouteAccess::Authenticated,
            ));
        }
        for pattern in DENY_ALL {
            rules.push(RouteRule::new(None, pattern.parse()?, RouteAccess::DenyAll));
        }
        for (method, pattern, roles) in ROLE_RULES {
            let method = method
                .map(|m| Method::from_bytes(m.as_bytes()))
                .transpose()
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            rules.push(RouteRule::new(
                method,
                pattern.parse()?,
                RouteAccess::Roles(roles.iter().copied().collect()),
            ));
        }
        Ok(Self::new(rules))
    }

    /// Builds the table from configuration entries, falling back to the
    /// built-in table when none are configured.
    pub fn from_config(entries: &[RouteRuleConfig]) -> Result<Self, AuthError> {
        if entries.is_empty() {
            return Self::default_table();
        }
        entries
            .iter()
            .map(rule_from_config)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

fn rule_from_config(entry: &RouteRuleConfig) -> Result<RouteRule, AuthError> {
    let method = entry
        .method
        .as_deref()
        .filter(|m| !m.is_empty() && *m != "*")
        .map(|m| {
            Method::from_str(&m.to_ascii_uppercase())
                .map_err(|_| AuthError::Validation(format!("Unknown HTTP method '{m}'")))
        })
        .transpose()?;

    let pattern = PathPattern::parse(&entry.pattern)?;

    let access = if !entry.roles.is_empty() {
        let roles = entry
            .roles
            .iter()
            .map(|r| Role::from_str(r).map_err(|e| AuthError::Validation(e.message)))
            .collect::<Result<HashSet<_>, _>>()?;
        RouteAccess::Roles(roles)
    } else {
        match entry.access.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("public") => RouteAccess::Public,
            Some("authenticated") => RouteAccess::Authenticated,
            Some("deny_all") | Some("denyall") => RouteAccess::DenyAll,
            Some(other) => {
                return Err(AuthError::Validation(format!(
                    "Unknown access '{other}' for route '{}'",
                    entry.pattern
                )));
            }
        }
    };

    Ok(RouteRule::new(method, pattern, access))
}
