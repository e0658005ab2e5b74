// src/registrations/handlers.rs

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{
    CandidateRegistration, FieldValidation, Registration, RegistrationCount, RegistrationForm,
};
use super::validators::RegistrationValidator;
use crate::common::{
    generate_registration_id, safe_email_log, ApiError, AppState, FieldName, ValidationResult,
    Validator,
};

/// GET /api/users - List every accepted registration
pub async fn list_registrations(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let state = state_lock.read().await.clone();

    let registrations = state.store.list().await.map_err(|e| {
        error!(error = %e, backend = state.store.backend_name(), "Error loading registrations");
        ApiError::from(e)
    })?;

    debug!(count = registrations.len(), "Fetched registrations");
    Ok(Json(registrations))
}

/// GET /api/users/count - Number of accepted registrations
pub async fn count_registrations(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<RegistrationCount>, ApiError> {
    let state = state_lock.read().await.clone();
    let registrations = state.store.list().await?;
    Ok(Json(RegistrationCount {
        count: registrations.len(),
    }))
}

/// POST /api/users/validate - Validate a form without storing it
pub async fn validate_registration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let Json(form) = payload?;
    let state = state_lock.read().await.clone();

    let existing = state.store.list().await?;
    let today = Utc::now().date_naive();
    let candidate = CandidateRegistration::from(form);

    let result = RegistrationValidator::new(&existing, today)
        .with_policy(state.age_policy)
        .validate(&candidate);

    debug!(
        email = %safe_email_log(&candidate.email),
        is_valid = result.is_valid,
        "Validated registration form"
    );

    Ok(Json(result))
}

/// POST /api/users/validate/:field - Check one field of a form
pub async fn validate_registration_field(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(field): Path<FieldName>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<Json<FieldValidation>, ApiError> {
    let Json(form) = payload?;
    let state = state_lock.read().await.clone();

    // Only the email rule needs the existing registrants
    let existing = if field == FieldName::Email {
        state.store.list().await?
    } else {
        Vec::new()
    };
    let candidate = CandidateRegistration::from(form);

    let error = RegistrationValidator::new(&existing, Utc::now().date_naive())
        .with_policy(state.age_policy)
        .validate_field(field, &candidate)
        .err();

    Ok(Json(FieldValidation {
        field,
        is_valid: error.is_none(),
        error,
    }))
}

/// POST /api/users - Validate and store a new registration
pub async fn create_registration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let Json(form) = payload?;
    let state = state_lock.read().await.clone();

    // One clock read per submission
    let now = Utc::now();
    let candidate = CandidateRegistration::from(form);

    info!(
        email = %safe_email_log(&candidate.email),
        backend = state.store.backend_name(),
        "Registering new user"
    );

    let existing = state.store.list().await.map_err(|e| {
        error!(error = %e, "Failed to load existing registrations");
        ApiError::from(e)
    })?;

    let validation_result = RegistrationValidator::new(&existing, now.date_naive())
        .with_policy(state.age_policy)
        .validate(&candidate);
    if !validation_result.is_valid {
        warn!(
            email = %safe_email_log(&candidate.email),
            errors = ?validation_result.errors,
            "Registration validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let registration = Registration::accept(candidate, generate_registration_id(), now.to_rfc3339())
        .ok_or_else(|| ApiError::InternalServer("Birth date missing after validation".to_string()))?;

    let stored = state.store.add(registration).await.map_err(|e| {
        warn!(error = %e, "Registration store refused the new user");
        ApiError::from(e)
    })?;

    info!(
        registration_id = ?stored.id,
        name = %stored.full_name(),
        "Registration successful"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}
