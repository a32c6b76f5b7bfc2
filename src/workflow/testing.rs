//! Test doubles shared across modules: an in-memory person store and a
//! scripted role authority.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::policy::RequiredRole;
use crate::auth::role_client::{AuthorityError, RoleAuthority};
use crate::domain::person::{NewPerson, Person, PersonDraft};
use crate::workflow::registry::{PersonStore, StoreError};

/// A known-good candidate, matching the end-to-end scenario in the tests.
pub fn valid_draft() -> PersonDraft {
    PersonDraft {
        names: Some("Juan".into()),
        lastnames: Some("Pérez".into()),
        password: Some("password123".into()),
        document: Some("12345678".into()),
        birthdate: NaiveDate::from_ymd_opt(1990, 5, 15),
        address: Some("Calle 123".into()),
        phone: Some("3001234567".into()),
        email: Some("juan@example.com".into()),
        base_salary: Some(Decimal::from(5_000_000)),
        ..Default::default()
    }
}

/// In-memory `PersonStore`. With the blind pre-check enabled the existence
/// query always reports vacant while `insert` still enforces uniqueness,
/// simulating a concurrent registration winning the race.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Person>>,
    blind_precheck: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blind_precheck() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            blind_precheck: true,
        }
    }

    fn duplicate(records: &[Person], email: &str, document: &str, exclude: Option<Uuid>) -> bool {
        records
            .iter()
            .any(|p| Some(p.id) != exclude && (p.email == email || p.document == document))
    }
}

#[async_trait]
impl PersonStore for InMemoryStore {
    async fn exists_by_email_or_document(
        &self,
        email: &str,
        document: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        if self.blind_precheck {
            return Ok(false);
        }
        let records = self.records.lock().unwrap();
        Ok(Self::duplicate(&records, email, document, exclude))
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Person>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|p| p.document == document).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Person>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert(&self, person: NewPerson) -> Result<Person, StoreError> {
        let mut records = self.records.lock().unwrap();
        if Self::duplicate(&records, &person.email, &person.document, None) {
            return Err(StoreError::UniquenessViolation);
        }
        let person = person.with_id(Uuid::new_v4());
        records.push(person.clone());
        Ok(person)
    }

    async fn update(&self, person: Person) -> Result<Option<Person>, StoreError> {
        let mut records = self.records.lock().unwrap();
        if Self::duplicate(&records, &person.email, &person.document, Some(person.id)) {
            return Err(StoreError::UniquenessViolation);
        }
        match records.iter_mut().find(|p| p.id == person.id) {
            Some(slot) => {
                *slot = person.clone();
                Ok(Some(person))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.records.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

/// Store whose calls never complete, for exercising the per-call bound.
pub struct StalledStore;

#[async_trait]
impl PersonStore for StalledStore {
    async fn exists_by_email_or_document(
        &self,
        _email: &str,
        _document: &str,
        _exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        std::future::pending().await
    }

    async fn find_by_document(&self, _document: &str) -> Result<Option<Person>, StoreError> {
        std::future::pending().await
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Person>, StoreError> {
        std::future::pending().await
    }

    async fn list(&self, _offset: i64, _limit: i64) -> Result<Vec<Person>, StoreError> {
        std::future::pending().await
    }

    async fn insert(&self, _person: NewPerson) -> Result<Person, StoreError> {
        std::future::pending().await
    }

    async fn update(&self, _person: Person) -> Result<Option<Person>, StoreError> {
        std::future::pending().await
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<(), StoreError> {
        std::future::pending().await
    }
}

/// What the scripted authority answers.
#[derive(Debug, Clone, Copy)]
pub enum Verdict {
    Grant,
    Deny,
    Fail,
}

/// Role authority double that counts calls, for asserting the gate never
/// reaches the authority on short-circuit paths.
pub struct ScriptedAuthority {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl ScriptedAuthority {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleAuthority for ScriptedAuthority {
    async fn check_role(&self, _token: &str, _role: RequiredRole) -> Result<bool, AuthorityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.verdict {
            Verdict::Grant => Ok(true),
            Verdict::Deny => Ok(false),
            Verdict::Fail => Err(AuthorityError::Unavailable("connection refused".into())),
        }
    }
}
