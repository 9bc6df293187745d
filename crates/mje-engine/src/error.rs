//! Error type for an export run
//!
//! Configuration errors and transport failures abort the run; conflicts
//! and "not found" lookups never reach this type because the engine and
//! clients absorb them locally.

use mje_jenkins::JenkinsError;
use mje_maestro::MaestroError;
use mje_model::{ConfigXmlError, MapError};

/// Run-aborting export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Jenkins query or config write failed.
    #[error("jenkins: {0}")]
    Jenkins(#[from] JenkinsError),

    /// Maestro call failed.
    #[error("maestro: {0}")]
    Maestro(#[from] MaestroError),

    /// Mapping a job required configuration that is missing.
    #[error("mapping: {0}")]
    Map(#[from] MapError),

    /// Rewriting a job config document failed.
    #[error("config.xml: {0}")]
    ConfigXml(#[from] ConfigXmlError),

    /// The run configuration is incomplete.
    #[error("configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ExportError::Config("task type 'jenkins plugin' is not registered".to_string());
        assert!(err.to_string().starts_with("configuration:"));
    }
}
