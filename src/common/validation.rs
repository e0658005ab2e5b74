// Common validation types and traits

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Form fields a validation error can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    LastName,
    Email,
    BirthDate,
    City,
    PostalCode,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::Email => "email",
            FieldName::BirthDate => "birthDate",
            FieldName::City => "city",
            FieldName::PostalCode => "postalCode",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a whole form.
///
/// `errors` only ever holds fields that failed, one message per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<FieldName, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn add_error(&mut self, field: FieldName, message: &str) {
        self.is_valid = false;
        self.errors.insert(field, message.to_string());
    }

    /// Records `outcome` under `field` when it is an error
    pub fn record<E: fmt::Display>(&mut self, field: FieldName, outcome: Result<(), E>) {
        if let Err(e) = outcome {
            self.add_error(field, &e.to_string());
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_record_keeps_only_failures() {
        let mut result = ValidationResult::new();
        result.record::<String>(FieldName::City, Ok(()));
        result.record(FieldName::PostalCode, Err("bad code"));

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors.get(&FieldName::PostalCode).map(String::as_str), Some("bad code"));
        assert_eq!(result.errors.get(&FieldName::City).map(String::as_str), None);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut result = ValidationResult::new();
        result.add_error(FieldName::PostalCode, "Postal code must be exactly 5 digits");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isValid": false,
                "errors": { "postalCode": "Postal code must be exactly 5 digits" }
            })
        );
    }
}
