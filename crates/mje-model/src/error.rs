//! Error types for the entity model
//!
//! Covers the two failure surfaces of this crate:
//! - Mapping a source record into a destination record
//! - Parsing or rewriting a job `config.xml` document

/// Mapping failures.
///
/// Missing-endpoint variants are configuration errors: the run cannot
/// produce a correct composition for the job at hand, so the caller is
/// expected to abort rather than skip.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A Sonar-enabled job was encountered but no Sonar task type is
    /// registered in the destination.
    #[error("job '{0}' requires a sonar task but no sonar task type is registered")]
    MissingSonarTaskType(String),

    /// A Sonar-enabled job was encountered but neither an external Sonar
    /// source nor an inline Sonar URL is configured.
    #[error("job '{0}' requires a sonar task but no sonar url or source is configured")]
    MissingSonarEndpoint(String),

    /// The job config document advertises a Sonar publisher but carries no
    /// resolvable group/artifact coordinates.
    #[error("job '{0}' has a sonar publisher but no maven coordinates")]
    MissingMavenCoordinates(String),
}

/// Job `config.xml` document failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigXmlError {
    /// The document is not well-formed XML.
    #[error("malformed config.xml: {0}")]
    Malformed(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("bad attribute in config.xml: {0}")]
    BadAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document has no root element.
    #[error("config.xml has no root element")]
    NoRoot,

    /// The rewritten document is not valid UTF-8.
    #[error("rewritten config.xml is not utf-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    /// Writing the rewritten document failed.
    #[error("config.xml rewrite failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_error_display() {
        let err = MapError::MissingSonarEndpoint("Test Job".to_string());
        assert!(err.to_string().contains("Test Job"));
        assert!(err.to_string().contains("sonar"));
    }

    #[test]
    fn config_xml_error_display() {
        let err = ConfigXmlError::NoRoot;
        assert!(err.to_string().contains("no root element"));
    }
}
