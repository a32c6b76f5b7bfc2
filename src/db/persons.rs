//! Postgres-backed person store
//!
//! The unique indexes on email and document are the single source of truth
//! for conflict arbitration; a unique violation on insert or update surfaces
//! as `StoreError::UniquenessViolation` so the workflow can shape it.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::person::{NewPerson, Person};
use crate::workflow::registry::{PersonStore, StoreError};

#[derive(sqlx::FromRow)]
struct PersonRow {
    id: Uuid,
    names: String,
    lastnames: String,
    password: String,
    document: String,
    birthdate: Option<NaiveDate>,
    address: Option<String>,
    phone: Option<String>,
    email: String,
    base_salary: Decimal,
    role: i64,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            names: row.names,
            lastnames: row.lastnames,
            password: row.password,
            document: row.document,
            birthdate: row.birthdate,
            address: row.address,
            phone: row.phone,
            email: row.email,
            base_salary: row.base_salary,
            role: row.role,
        }
    }
}

pub struct PgPersonStore {
    pool: PgPool,
}

impl PgPersonStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::UniquenessViolation;
        }
    }
    StoreError::Backend(err.into())
}

#[async_trait]
impl PersonStore for PgPersonStore {
    async fn exists_by_email_or_document(
        &self,
        email: &str,
        document: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM persons
                 WHERE (email = $1 OR document = $2)
                   AND ($3::uuid IS NULL OR id <> $3)
             )",
        )
        .bind(email)
        .bind(document)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(exists)
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Person>, StoreError> {
        sqlx::query_as::<_, PersonRow>("SELECT * FROM persons WHERE document = $1")
            .bind(document)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Person::from))
            .map_err(map_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, StoreError> {
        sqlx::query_as::<_, PersonRow>("SELECT * FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Person::from))
            .map_err(map_err)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Person>, StoreError> {
        sqlx::query_as::<_, PersonRow>(
            "SELECT * FROM persons ORDER BY created_at LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(Person::from).collect())
        .map_err(map_err)
    }

    async fn insert(&self, person: NewPerson) -> Result<Person, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO persons
                 (id, names, lastnames, password, document, birthdate,
                  address, phone, email, base_salary, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(id)
        .bind(&person.names)
        .bind(&person.lastnames)
        .bind(&person.password)
        .bind(&person.document)
        .bind(person.birthdate)
        .bind(&person.address)
        .bind(&person.phone)
        .bind(&person.email)
        .bind(person.base_salary)
        .bind(person.role)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(person.with_id(id))
    }

    async fn update(&self, person: Person) -> Result<Option<Person>, StoreError> {
        let result = sqlx::query(
            "UPDATE persons
             SET names = $2, lastnames = $3, password = $4, document = $5,
                 birthdate = $6, address = $7, phone = $8, email = $9,
                 base_salary = $10, role = $11
             WHERE id = $1",
        )
        .bind(person.id)
        .bind(&person.names)
        .bind(&person.lastnames)
        .bind(&person.password)
        .bind(&person.document)
        .bind(person.birthdate)
        .bind(&person.address)
        .bind(&person.phone)
        .bind(&person.email)
        .bind(person.base_salary)
        .bind(person.role)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok((result.rows_affected() > 0).then_some(person))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}
