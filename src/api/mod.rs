//! API routes for person-registry

pub mod health;
pub mod persons;

use axum::extract::{FromRequest, Request};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::auth::gate::authorization_gate;
use crate::error::{AppError, ErrorCode, error_envelope};
use crate::state::AppState;

/// `Json` extractor whose rejection is rendered through the standard error
/// envelope instead of axum's plain-text default.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::with_message(
                ErrorCode::Validation,
                rejection.body_text(),
            )),
        }
    }
}

/// Create the service router. The authorization gate wraps every route; the
/// error envelope sits outside it so denials are formatted exactly like
/// handler failures.
pub fn create_router(state: AppState) -> Router {
    let usuarios = Router::new()
        .route(
            "/api/v1/usuarios",
            post(persons::create)
                .get(persons::list)
                .patch(persons::update),
        )
        .route(
            "/api/v1/usuarios/{key}",
            get(persons::get_person).delete(persons::remove),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(usuarios)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorization_gate,
        ))
        .layer(middleware::from_fn(error_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
