//! Person API handlers
//!
//! POST   /api/v1/usuarios        — register a new person (201 + Location)
//! GET    /api/v1/usuarios/{doc}  — fetch by document number
//! GET    /api/v1/usuarios        — paged listing (defaults page=1, limit=10)
//! DELETE /api/v1/usuarios/{id}   — delete by id, echoes the id
//! PATCH  /api/v1/usuarios        — full replace, id carried in the body

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppJson;
use crate::domain::person::{Person, PersonDraft};
use crate::error::{AppError, ErrorCode};
use crate::state::AppState;
use crate::workflow::registry::{DEFAULT_LIMIT, DEFAULT_PAGE};

// ── Response types ──

/// What callers see. The credential placeholder and salary are never echoed.
#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: Uuid,
    pub names: String,
    pub lastnames: String,
    pub document: String,
    pub email: String,
}

impl From<Person> for PersonResponse {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            names: p.names,
            lastnames: p.lastnames,
            document: p.document,
            email: p.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

// ── POST /api/v1/usuarios ──

pub async fn create(
    State(state): State<AppState>,
    AppJson(draft): AppJson<PersonDraft>,
) -> Result<impl IntoResponse, AppError> {
    let person = state.registry.register(draft).await?;
    tracing::info!(person_id = %person.id, "Person created");

    let location = format!("/api/v1/usuarios/{}", person.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PersonResponse::from(person)),
    ))
}

// ── GET /api/v1/usuarios/{document} ──

pub async fn get_person(
    State(state): State<AppState>,
    Path(document): Path<String>,
) -> Result<Json<PersonResponse>, AppError> {
    let person = state.registry.lookup(&document).await?;
    tracing::info!(person_id = %person.id, "Person found");
    Ok(Json(PersonResponse::from(person)))
}

// ── GET /api/v1/usuarios ──

/// Raw strings so a malformed value falls back to the default instead of
/// failing the read.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let page = params
        .page
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PAGE);
    let limit = params
        .limit
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let persons = state.registry.list(page, limit).await?;
    tracing::info!(total = persons.len(), "Persons listed");
    Ok(Json(
        persons.into_iter().map(PersonResponse::from).collect(),
    ))
}

// ── DELETE /api/v1/usuarios/{id} ──

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::with_message(ErrorCode::Validation, "Invalid user id"))?;

    let id = state.registry.remove(id).await?;
    Ok(Json(DeleteResponse {
        message: format!("Deleted user {id}"),
    }))
}

// ── PATCH /api/v1/usuarios ──

pub async fn update(
    State(state): State<AppState>,
    AppJson(draft): AppJson<PersonDraft>,
) -> Result<impl IntoResponse, AppError> {
    let person = state.registry.replace(draft).await?;
    tracing::info!(person_id = %person.id, "Person updated");
    Ok((StatusCode::ACCEPTED, Json(PersonResponse::from(person))))
}
