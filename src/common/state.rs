// Application state shared across all modules

use std::sync::Arc;

use crate::registrations::validators::AgePolicy;
use crate::services::RegistrationStore;

/// Application state containing the registration store and validation policy
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub age_policy: AgePolicy,
}
