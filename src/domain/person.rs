//! Person model and the ordered validation cascade
//!
//! Validation is a flat list of predicate checks evaluated in order; the
//! first failure short-circuits, so the user-visible first error is a
//! property of the list, not of scattered control flow. Missing-field checks
//! run before range and format checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

/// Upper bound for `base_salary`, inclusive.
pub const MAX_BASE_SALARY: i64 = 15_000_000;

/// Role id assigned when the caller does not supply one.
pub const DEFAULT_ROLE_ID: i64 = 3;

/// A persisted person. The identifier is assigned by the store on the first
/// successful insert and never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub names: String,
    pub lastnames: String,
    pub password: String,
    pub document: String,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub base_salary: Decimal,
    pub role: i64,
}

/// A validated candidate without an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub names: String,
    pub lastnames: String,
    pub password: String,
    pub document: String,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub base_salary: Decimal,
    pub role: i64,
}

impl NewPerson {
    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: Uuid) -> Person {
        Person {
            id,
            names: self.names,
            lastnames: self.lastnames,
            password: self.password,
            document: self.document,
            birthdate: self.birthdate,
            address: self.address,
            phone: self.phone,
            email: self.email,
            base_salary: self.base_salary,
            role: self.role,
        }
    }
}

/// Caller-supplied candidate fields. Everything is optional here so the
/// cascade, not the deserializer, reports the first missing field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
    pub id: Option<Uuid>,
    pub names: Option<String>,
    pub lastnames: Option<String>,
    pub password: Option<String>,
    pub document: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub base_salary: Option<Decimal>,
    pub role: Option<i64>,
}

/// First failing validation check: offending field plus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

type Check = fn(&PersonDraft) -> Option<FieldError>;

/// The cascade. Order is significant for deterministic error reporting.
const CHECKS: &[Check] = &[
    require_names,
    require_lastnames,
    require_document,
    require_email,
    require_salary,
    salary_in_range,
    email_well_formed,
];

/// Evaluate the cascade, stopping at the first failure.
pub fn validate(draft: &PersonDraft) -> Result<(), FieldError> {
    match CHECKS.iter().find_map(|check| check(draft)) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn require_names(d: &PersonDraft) -> Option<FieldError> {
    blank(&d.names).then_some(FieldError {
        field: "names",
        message: "Names required",
    })
}

fn require_lastnames(d: &PersonDraft) -> Option<FieldError> {
    blank(&d.lastnames).then_some(FieldError {
        field: "lastnames",
        message: "Last names required",
    })
}

fn require_document(d: &PersonDraft) -> Option<FieldError> {
    blank(&d.document).then_some(FieldError {
        field: "document",
        message: "Document required",
    })
}

fn require_email(d: &PersonDraft) -> Option<FieldError> {
    blank(&d.email).then_some(FieldError {
        field: "email",
        message: "Email required",
    })
}

fn require_salary(d: &PersonDraft) -> Option<FieldError> {
    d.base_salary.is_none().then_some(FieldError {
        field: "baseSalary",
        message: "Base salary required",
    })
}

fn salary_in_range(d: &PersonDraft) -> Option<FieldError> {
    match d.base_salary {
        Some(s) if s < Decimal::ZERO || s > Decimal::from(MAX_BASE_SALARY) => Some(FieldError {
            field: "baseSalary",
            message: "Base salary out of valid range [0, 15000000]",
        }),
        _ => None,
    }
}

fn email_well_formed(d: &PersonDraft) -> Option<FieldError> {
    match d.email.as_deref() {
        Some(email) if !email.validate_email() => Some(FieldError {
            field: "email",
            message: "Invalid email",
        }),
        _ => None,
    }
}

impl PersonDraft {
    /// Run the cascade and produce an insert candidate. Registration always
    /// creates a new identity, so a caller-supplied id is rejected.
    pub fn try_into_new(self) -> Result<NewPerson, FieldError> {
        validate(&self)?;
        if self.id.is_some() {
            return Err(FieldError {
                field: "id",
                message: "Id must not be provided on registration",
            });
        }
        Ok(NewPerson {
            names: self.names.unwrap_or_default(),
            lastnames: self.lastnames.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            document: self.document.unwrap_or_default(),
            birthdate: self.birthdate,
            address: self.address,
            phone: self.phone,
            email: self.email.unwrap_or_default(),
            base_salary: self.base_salary.unwrap_or_default(),
            role: self.role.unwrap_or(DEFAULT_ROLE_ID),
        })
    }

    /// Run the cascade and produce a full replacement record. The target
    /// identifier must be carried in the draft.
    pub fn try_into_person(self) -> Result<Person, FieldError> {
        validate(&self)?;
        let id = self.id.ok_or(FieldError {
            field: "id",
            message: "Id required",
        })?;
        Ok(Person {
            id,
            names: self.names.unwrap_or_default(),
            lastnames: self.lastnames.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            document: self.document.unwrap_or_default(),
            birthdate: self.birthdate,
            address: self.address,
            phone: self.phone,
            email: self.email.unwrap_or_default(),
            base_salary: self.base_salary.unwrap_or_default(),
            role: self.role.unwrap_or(DEFAULT_ROLE_ID),
        })
    }
}
