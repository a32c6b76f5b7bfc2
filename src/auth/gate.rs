//! Request authorization gate
//!
//! Middleware that classifies each request against the static policy,
//! extracts the bearer token, and asks the role authority for a decision.
//! No decision means no access: an authority failure denies exactly like a
//! negative answer. Nothing is cached across requests.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, ErrorCode};
use crate::state::AppState;

use super::policy::{self, Access};

pub async fn authorization_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let access = policy::classify(&path, &method);
    if access == Access::Public {
        tracing::debug!(%path, "Public endpoint accessed");
        return Ok(next.run(request).await);
    }

    // Denied before any authority round trip when no token is present.
    let Some(token) = bearer_token(&request) else {
        tracing::warn!(%path, "No token found in request");
        return Err(
            AppError::with_message(ErrorCode::Unauthenticated, "No token found in request")
                .into_response(),
        );
    };

    let Access::Role(role) = access else {
        // Token present and well-formed is enough for the remaining paths.
        return Ok(next.run(request).await);
    };

    match state.authority.check_role(&token, role).await {
        Ok(true) => {
            tracing::debug!(%path, %method, role = role.describe(), "Role validated");
            Ok(next.run(request).await)
        }
        Ok(false) => {
            tracing::warn!(%path, %method, role = role.describe(), "Role validation denied");
            Err(AppError::with_message(
                ErrorCode::Forbidden,
                format!("{} role required", role.describe()),
            )
            .into_response())
        }
        // Fail closed.
        Err(err) => {
            tracing::error!(%path, %method, error = %err, "Role authority unavailable");
            Err(AppError::with_message(
                ErrorCode::Forbidden,
                format!("Could not verify {} role", role.describe()),
            )
            .into_response())
        }
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, middleware, routing::get};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::workflow::registry::RegistrationWorkflow;
    use crate::workflow::testing::{InMemoryStore, ScriptedAuthority, Verdict};

    fn gated_app(authority: Arc<ScriptedAuthority>) -> Router {
        let state = AppState {
            registry: Arc::new(RegistrationWorkflow::new(Arc::new(InMemoryStore::new()))),
            authority,
        };
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/api/v1/usuarios", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                authorization_gate,
            ))
            .with_state(state)
    }

    fn request(path: &str, token: Option<&str>) -> Request<axum::body::Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_token_denied_without_authority_call() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Grant));
        let app = gated_app(authority.clone());

        let response = app.oneshot(request("/api/v1/usuarios", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(authority.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_authorization_header_denied() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Grant));
        let app = gated_app(authority.clone());

        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/usuarios")
            .header("Authorization", "Basic abc123")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(authority.call_count(), 0);
    }

    #[tokio::test]
    async fn authority_grant_forwards_request() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Grant));
        let app = gated_app(authority.clone());

        let response = app
            .oneshot(request("/api/v1/usuarios", Some("valid-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(authority.call_count(), 1);
    }

    #[tokio::test]
    async fn authority_denial_is_forbidden() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Deny));
        let app = gated_app(authority.clone());

        let response = app
            .oneshot(request("/api/v1/usuarios", Some("client-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn authority_failure_denies_fail_closed() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Fail));
        let app = gated_app(authority.clone());

        let response = app
            .oneshot(request("/api/v1/usuarios", Some("valid-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(authority.call_count(), 1);
    }

    #[tokio::test]
    async fn public_path_skips_token_and_authority() {
        let authority = Arc::new(ScriptedAuthority::new(Verdict::Deny));
        let app = gated_app(authority.clone());

        let response = app.oneshot(request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(authority.call_count(), 0);
    }
}
