//! Error type for the Jenkins client

/// Jenkins client failures.
///
/// Transport and server-side errors are not retried here; they propagate
/// to the caller and abort the run.
#[derive(Debug, thiserror::Error)]
pub enum JenkinsError {
    /// Transport-level failure.
    #[error("jenkins request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("jenkins returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The configured connection parameters do not form a valid URL.
    #[error("invalid jenkins url: {0}")]
    BadUrl(String),

    /// A fetched `config.xml` could not be parsed.
    #[error("job '{job}' config.xml: {source}")]
    BadConfig {
        job: String,
        source: mje_model::ConfigXmlError,
    },
}
