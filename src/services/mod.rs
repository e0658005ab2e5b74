// src/services/mod.rs
//
// Registration storage backends

pub mod local_store;
pub mod remote_store;
pub mod store;

// Re-export commonly used types for convenience
pub use local_store::LocalStore;
pub use remote_store::RemoteStore;
pub use store::{RegistrationStore, StoreError};
