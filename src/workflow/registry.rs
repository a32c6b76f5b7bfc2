//! Person registration workflow
//!
//! Validation, the uniqueness pre-check, and error shaping live here. The
//! pre-check is a fast reject only; the store's own constraint is the final
//! arbiter for concurrent registrations, and its violation is remapped to the
//! same conflict shape so callers cannot tell which layer caught it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::person::{NewPerson, Person, PersonDraft};
use crate::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Storage failure taxonomy. `UniquenessViolation` is distinguishable so the
/// workflow can map it to the same `Conflict` the pre-check produces.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("uniqueness constraint violated")]
    UniquenessViolation,
    #[error("storage call timed out")]
    Timeout,
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Port for durable person storage.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// True when a record other than `exclude` already holds `email` or
    /// `document`. `exclude` keeps a record's own row out of the comparison
    /// so updates of unchanged values do not self-conflict.
    async fn exists_by_email_or_document(
        &self,
        email: &str,
        document: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    async fn find_by_document(&self, document: &str) -> Result<Option<Person>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, StoreError>;

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Person>, StoreError>;

    /// Insert a new record, assigning its identifier.
    async fn insert(&self, person: NewPerson) -> Result<Person, StoreError>;

    /// Full replace by id. `None` when no record has that id.
    async fn update(&self, person: Person) -> Result<Option<Person>, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Caller-facing paging defaults, applied on malformed input.
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound on any single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create/read/list/delete/replace lifecycle of `Person` with validation and
/// uniqueness integrity. Stateless per call.
pub struct RegistrationWorkflow {
    store: Arc<dyn PersonStore>,
    store_timeout: Duration,
}

impl RegistrationWorkflow {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn PersonStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Bound a store call so a stalled backend cannot hold the request open.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }

    /// Validate and persist a new person. At most one registration per
    /// email/document ever succeeds, regardless of interleaving.
    pub async fn register(&self, draft: PersonDraft) -> Result<Person, AppError> {
        let candidate = draft.try_into_new().map_err(AppError::validation)?;
        let (email, document) = (candidate.email.clone(), candidate.document.clone());

        // Advisory pre-check: avoids a doomed write in the common case.
        let taken = self
            .bounded(self.store.exists_by_email_or_document(&email, &document, None))
            .await
            .map_err(store_failure)?;
        if taken {
            return Err(conflict(&email, &document));
        }

        match self.bounded(self.store.insert(candidate)).await {
            Ok(person) => {
                tracing::info!(person_id = %person.id, "Person registered");
                Ok(person)
            }
            // The constraint closes the race the pre-check leaves open.
            Err(StoreError::UniquenessViolation) => Err(conflict(&email, &document)),
            Err(err) => Err(store_failure(err)),
        }
    }

    pub async fn lookup(&self, document: &str) -> Result<Person, AppError> {
        self.bounded(self.store.find_by_document(document))
            .await
            .map_err(store_failure)?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::NotFound, format!("Person not found: {document}"))
            })
    }

    /// Paged listing. Caller-facing pages are 1-based; the store is
    /// offset-based. Malformed paging clamps to defaults rather than failing.
    pub async fn list(&self, page: i64, limit: i64) -> Result<Vec<Person>, AppError> {
        let page = if page > 0 { page } else { DEFAULT_PAGE };
        let limit = if limit > 0 { limit } else { DEFAULT_LIMIT };
        self.bounded(self.store.list((page - 1) * limit, limit))
            .await
            .map_err(store_failure)
    }

    /// Confirm existence, delete, and echo the identifier.
    pub async fn remove(&self, id: Uuid) -> Result<Uuid, AppError> {
        let existing = self
            .bounded(self.store.find_by_id(id))
            .await
            .map_err(store_failure)?;
        if existing.is_none() {
            return Err(AppError::with_message(
                ErrorCode::NotFound,
                format!("User not found: {id}"),
            ));
        }
        self.bounded(self.store.delete_by_id(id))
            .await
            .map_err(store_failure)?;
        tracing::info!(person_id = %id, "Person deleted");
        Ok(id)
    }

    /// Full replace. The uniqueness check excludes the record's own id so an
    /// update of an unchanged email/document does not spuriously conflict.
    pub async fn replace(&self, draft: PersonDraft) -> Result<Person, AppError> {
        let person = draft.try_into_person().map_err(AppError::validation)?;
        let (id, email, document) = (person.id, person.email.clone(), person.document.clone());

        let taken = self
            .bounded(
                self.store
                    .exists_by_email_or_document(&email, &document, Some(id)),
            )
            .await
            .map_err(store_failure)?;
        if taken {
            return Err(conflict(&email, &document));
        }

        match self.bounded(self.store.update(person)).await {
            Ok(Some(updated)) => {
                tracing::info!(person_id = %updated.id, "Person updated");
                Ok(updated)
            }
            Ok(None) => Err(AppError::with_message(
                ErrorCode::NotFound,
                format!("User not found: {id}"),
            )),
            Err(StoreError::UniquenessViolation) => Err(conflict(&email, &document)),
            Err(err) => Err(store_failure(err)),
        }
    }
}

/// Conflict naming both offending values, whichever layer detected it.
fn conflict(email: &str, document: &str) -> AppError {
    AppError::with_message(
        ErrorCode::Conflict,
        format!("Document or email already registered: {email} - {document}"),
    )
}

fn store_failure(err: StoreError) -> AppError {
    match err {
        StoreError::UniquenessViolation => AppError::new(ErrorCode::Conflict),
        StoreError::Timeout => {
            tracing::error!("Person store call timed out");
            AppError::new(ErrorCode::DependencyUnavailable)
        }
        StoreError::Backend(e) => {
            tracing::error!(error = %e, "Person store error");
            AppError::new(ErrorCode::DependencyUnavailable)
        }
    }
}
