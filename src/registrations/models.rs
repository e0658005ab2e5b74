// src/registrations/models.rs

use serde::{Deserialize, Deserializer, Serialize};

use super::age::DateValue;
use crate::common::FieldName;

// ============================================================================
// Request Models
// ============================================================================

/// Registration form as submitted by the client.
/// Missing keys are treated as empty strings so every field still gets checked.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: String,
    pub city: String,
    pub postal_code: String,
}

/// Unvalidated registration, with the birth date already parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: DateValue,
    pub city: String,
    pub postal_code: String,
}

impl From<RegistrationForm> for CandidateRegistration {
    fn from(form: RegistrationForm) -> Self {
        Self {
            birth_date: DateValue::parse(&form.birth_date),
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            city: form.city,
            postal_code: form.postal_code,
        }
    }
}

// ============================================================================
// Stored Models
// ============================================================================

/// An accepted registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Registration {
    /// Builds the stored record from a candidate that passed validation.
    /// Returns `None` when the birth date never parsed.
    pub fn accept(candidate: CandidateRegistration, id: String, timestamp: String) -> Option<Self> {
        let birth_date = candidate.birth_date.as_date()?;
        Some(Self {
            id: Some(id),
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            birth_date: birth_date.format("%Y-%m-%d").to_string(),
            city: candidate.city,
            postal_code: candidate.postal_code,
            timestamp,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Anything already registered that carries an email
pub trait Registrant {
    fn email(&self) -> &str;
}

impl Registrant for Registration {
    fn email(&self) -> &str {
        &self.email
    }
}

impl Registrant for &str {
    fn email(&self) -> &str {
        self
    }
}

// ============================================================================
// Response Models
// ============================================================================

/// Outcome of checking a single form field
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    pub field: FieldName,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationCount {
    pub count: usize,
}

/// Remote list endpoints hand out numeric ids, local ones are strings
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
