//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map configuration, catalog and search failures to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use dashbrowse_client::ClientError;
use dashbrowse_config::{ConfigError, PreferenceError};
use thiserror::Error;

/// Structured exit codes for dashbrowse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - invalid config file, environment or flags.
    ///
    /// Scripts should fix the configuration and not retry.
    ConfigError = 2,

    /// Catalog error - missing, unreadable or malformed catalog file.
    CatalogError = 3,

    /// Search failed - the backend answered with an error.
    ///
    /// Scripts may retry if the failure was transient.
    SearchFailed = 4,

    /// Preference store could not be read or written.
    PreferencesError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// A search whose latest dispatch ended in an error.
#[derive(Debug, Error)]
#[error("Search failed: {0}")]
pub struct SearchFailed(pub String);

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::InvalidCatalog(_) | ClientError::Io(_) | ClientError::Json(_) => {
                ExitCode::CatalogError
            }
            ClientError::Backend { .. }
            | ClientError::Timeout(_)
            | ClientError::Abandoned
            | ClientError::NotLoaded { .. } => ExitCode::SearchFailed,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
            if cause.is::<ConfigError>() {
                return ExitCode::ConfigError;
            }
            if cause.is::<PreferenceError>() {
                return ExitCode::PreferencesError;
            }
            if cause.is::<SearchFailed>() {
                return ExitCode::SearchFailed;
            }
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::ConfigError.as_i32(), 2);
        assert_eq!(ExitCode::SearchFailed.as_i32(), 4);
    }

    #[test]
    fn test_from_client_error_catalog() {
        let err = ClientError::InvalidCatalog("duplicate uid".to_string());
        assert_eq!(ExitCode::from(&err), ExitCode::CatalogError);
    }

    #[test]
    fn test_from_client_error_backend() {
        let err = ClientError::Backend {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::SearchFailed);
    }

    #[test]
    fn test_exit_code_found_in_context_chain() {
        let err: anyhow::Error = Err::<(), _>(ClientError::InvalidCatalog("x".to_string()))
            .context("Failed to load catalog")
            .unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::CatalogError);
    }

    #[test]
    fn test_config_and_search_errors() {
        let err = anyhow::Error::new(ConfigError::DotenvUnknown);
        assert_eq!(err.exit_code(), ExitCode::ConfigError);

        let err = anyhow::Error::new(SearchFailed("boom".to_string()));
        assert_eq!(err.exit_code(), ExitCode::SearchFailed);

        let err = anyhow::anyhow!("something else");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
