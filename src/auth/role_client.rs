//! HTTP client for the external role authority
//!
//! The authority answers "does the bearer of this token hold this role?".
//! A transport failure is observable as an error distinct from a definite
//! negative answer, so the gate can fail closed on it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::policy::RequiredRole;

/// Failure to obtain a decision at all.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    #[error("role authority request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("role authority unavailable: {0}")]
    Unavailable(String),
}

/// Port for the external role authority.
#[async_trait]
pub trait RoleAuthority: Send + Sync {
    async fn check_role(&self, token: &str, role: RequiredRole) -> Result<bool, AuthorityError>;
}

#[derive(Debug, Deserialize)]
struct RoleValidationResponse {
    authorized: bool,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

/// Role authority reached over HTTP with a bounded per-request timeout.
pub struct HttpRoleAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoleAuthority {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RoleAuthority for HttpRoleAuthority {
    async fn check_role(&self, token: &str, role: RequiredRole) -> Result<bool, AuthorityError> {
        let url = format!(
            "{}/api/v1/validate/{}",
            self.base_url,
            role.validation_segment()
        );
        tracing::debug!(%url, "Validating role with authority");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let body: RoleValidationResponse = response.json().await?;
        Ok(body.authorized)
    }
}
