//! Settings resolution error types.
//!
//! Domain-specific errors for locating settings files, building the raw
//! settings document, and translating it into an immutable snapshot.

use thiserror::Error;

/// Settings resolution errors.
///
/// Every variant is fatal: resolution stops at the first error and no partial
/// snapshot is produced. Non-fatal builder problems are never represented here,
/// they are only logged.
///
/// The variants fall into two kinds, see [`SettingsError::is_config_not_found`]
/// and [`SettingsError::is_build_failure`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Settings file not found: {path} - {reason}")]
    ConfigNotFound { path: String, reason: String },

    #[error("Failed to build settings: {reason}")]
    BuildFailure { reason: String },

    #[error("Invalid URL in {field}: '{url}' - {reason}")]
    InvalidUrl {
        field: String,
        url: String,
        reason: String,
    },

    #[error("User home directory is not available: {reason}")]
    HomeDirectoryUnavailable { reason: String },

    #[error("Failed to decrypt {field}: {reason}")]
    DecryptionFailed { field: String, reason: String },
}

impl SettingsError {
    /// Returns `true` when a required settings file (or the tool home it is
    /// derived from) could not be located.
    pub fn is_config_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::HomeDirectoryUnavailable { .. }
        )
    }

    /// Returns `true` when the settings document could not be built, normalized
    /// or translated.
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            Self::BuildFailure { .. } | Self::InvalidUrl { .. } | Self::DecryptionFailed { .. }
        )
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
