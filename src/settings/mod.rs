//! Settings management
//! Schema, on-disk store, and the first-run onboarding flow

pub mod onboarding;
pub mod schema;
pub mod store;

pub use onboarding::{EnvDefaults, OnboardingError, OnboardingFlow};
pub use schema::{FieldKind, FieldSpec, Settings, SETTINGS_FIELDS};
pub use store::SettingsStore;

use thiserror::Error;

/// Error types for settings operations
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown settings field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
