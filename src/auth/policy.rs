//! Static role policy
//!
//! The mapping from (path prefix, method) to required access is data, not
//! code: a fixed table consulted per request, first match wins. Built once,
//! immutable for the process lifetime.

use http::Method;

/// Role a rule can demand from the external authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    AdminOrAdvisor,
    // No rule currently maps to Client; the table below is the production
    // policy and restoring a client rule is a one-line change.
    #[allow(dead_code)]
    Client,
}

impl RequiredRole {
    /// Path segment of the authority's validation endpoint.
    pub fn validation_segment(self) -> &'static str {
        match self {
            Self::AdminOrAdvisor => "admin-advisor",
            Self::Client => "client",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::AdminOrAdvisor => "Admin or advisor",
            Self::Client => "Client",
        }
    }
}

/// Access requirement for a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No token required.
    Public,
    /// Bearer token required and the authority must confirm the role.
    Role(RequiredRole),
    /// Bearer token required; no specific role.
    Authenticated,
}

struct Rule {
    prefix: &'static str,
    /// `None` matches every method.
    method: Option<Method>,
    access: Access,
}

impl Rule {
    fn matches(&self, path: &str, method: &Method) -> bool {
        let method_ok = self.method.as_ref().map_or(true, |m| m == method);
        // "/" is an exact match, everything else a prefix match.
        let path_ok = if self.prefix == "/" {
            path == "/"
        } else {
            path.starts_with(self.prefix)
        };
        method_ok && path_ok
    }
}

/// The production policy table. Unmatched requests fall through to
/// `Authenticated`.
const POLICY: &[Rule] = &[
    Rule {
        prefix: "/health",
        method: None,
        access: Access::Public,
    },
    Rule {
        prefix: "/",
        method: None,
        access: Access::Public,
    },
    Rule {
        prefix: "/api/v1/usuarios",
        method: Some(Method::POST),
        access: Access::Role(RequiredRole::AdminOrAdvisor),
    },
    Rule {
        prefix: "/api/v1/usuarios",
        method: Some(Method::DELETE),
        access: Access::Role(RequiredRole::AdminOrAdvisor),
    },
    Rule {
        prefix: "/api/v1/usuarios",
        method: Some(Method::PATCH),
        access: Access::Role(RequiredRole::AdminOrAdvisor),
    },
    Rule {
        prefix: "/api/v1/usuarios",
        method: Some(Method::GET),
        access: Access::Role(RequiredRole::AdminOrAdvisor),
    },
];

/// Classify a request. First matching rule wins.
pub fn classify(path: &str, method: &Method) -> Access {
    POLICY
        .iter()
        .find(|rule| rule.matches(path, method))
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated)
}
