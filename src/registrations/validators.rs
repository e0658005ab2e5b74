// src/registrations/validators.rs

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::age::{calculate_age, AgeParam, Person};
use super::models::{CandidateRegistration, Registrant};
use crate::common::{FieldName, ValidationResult, Validator};

// ============================================================================
// Field Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0}")]
    EmptyField(&'static str),

    #[error("{0}")]
    InvalidFormat(&'static str),

    #[error("Email already exists")]
    DuplicateEmail,
}

// Letters (ASCII and Latin-1), words joined by single spaces, apostrophes or hyphens
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ]+(?:[ '\-][A-Za-zÀ-ÖØ-öø-ÿ]+)*$").expect("valid name regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("valid postal code regex"));

// ============================================================================
// Field Validators
// ============================================================================

/// First or last name
pub fn validate_identity(name: &str) -> Result<(), FieldError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldError::EmptyField("Name is required"));
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(FieldError::InvalidFormat(
            "Name must contain only letters, spaces, apostrophes or hyphens",
        ));
    }
    Ok(())
}

/// Format is checked before uniqueness, so a malformed address never
/// reports a duplicate.
pub fn validate_email<R: Registrant>(email: &str, existing: &[R]) -> Result<(), FieldError> {
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::InvalidFormat("Invalid email format"));
    }
    if existing.iter().any(|r| r.email() == email) {
        return Err(FieldError::DuplicateEmail);
    }
    Ok(())
}

pub fn validate_postal_code(code: &str) -> Result<(), FieldError> {
    if !POSTAL_CODE_RE.is_match(code) {
        return Err(FieldError::InvalidFormat(
            "Postal code must be exactly 5 digits",
        ));
    }
    Ok(())
}

pub fn validate_city(city: &str) -> Result<(), FieldError> {
    let trimmed = city.trim();
    if trimmed.is_empty() {
        return Err(FieldError::EmptyField("City is required"));
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(FieldError::InvalidFormat(
            "City must contain only letters, spaces, apostrophes or hyphens",
        ));
    }
    Ok(())
}

// ============================================================================
// Age Policy
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgePolicy {
    pub minimum_age: Option<u32>,
}

impl AgePolicy {
    pub fn check(&self, age: i32) -> Result<(), String> {
        match self.minimum_age {
            Some(min) if age < min as i32 => {
                Err(format!("You must be at least {} years old to register", min))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Registration Validator
// ============================================================================

/// Checks every field of a candidate against a snapshot of existing registrants.
pub struct RegistrationValidator<'a, R: Registrant> {
    pub existing: &'a [R],
    pub today: NaiveDate,
    pub policy: AgePolicy,
}

impl<'a, R: Registrant> RegistrationValidator<'a, R> {
    pub fn new(existing: &'a [R], today: NaiveDate) -> Self {
        Self {
            existing,
            today,
            policy: AgePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AgePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn check_birth_date(&self, data: &CandidateRegistration) -> Result<(), String> {
        let param = AgeParam::Record(Person::born(data.birth_date));
        let age = calculate_age(Some(&param), self.today).map_err(|e| e.to_string())?;
        self.policy.check(age)
    }

    /// Runs the single rule behind `field`, as a form does when one input loses focus
    pub fn validate_field(
        &self,
        field: FieldName,
        data: &CandidateRegistration,
    ) -> Result<(), String> {
        let outcome = match field {
            FieldName::FirstName => validate_identity(&data.first_name),
            FieldName::LastName => validate_identity(&data.last_name),
            FieldName::Email => validate_email(&data.email, self.existing),
            FieldName::PostalCode => validate_postal_code(&data.postal_code),
            FieldName::City => validate_city(&data.city),
            FieldName::BirthDate => return self.check_birth_date(data),
        };
        outcome.map_err(|e| e.to_string())
    }
}

const FORM_ORDER: [FieldName; 6] = [
    FieldName::FirstName,
    FieldName::LastName,
    FieldName::Email,
    FieldName::PostalCode,
    FieldName::BirthDate,
    FieldName::City,
];

impl<R: Registrant> Validator<CandidateRegistration> for RegistrationValidator<'_, R> {
    fn validate(&self, data: &CandidateRegistration) -> ValidationResult {
        let mut result = ValidationResult::new();
        for field in FORM_ORDER {
            result.record(field, self.validate_field(field, data));
        }
        result
    }
}
