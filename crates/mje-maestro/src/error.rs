//! Error type for the Maestro client

/// Maestro client failures.
#[derive(Debug, thiserror::Error)]
pub enum MaestroError {
    /// Transport-level failure.
    #[error("maestro request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("maestro returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Session authentication was rejected.
    #[error("maestro login failed with {status}")]
    Login { status: reqwest::StatusCode },

    /// The entity already exists; callers treat this as the find path of
    /// find-or-create.
    #[error("maestro resource already exists: {0}")]
    Conflict(String),

    /// An operation needed an id the record does not carry yet.
    #[error("{0} has no destination id")]
    MissingId(String),

    /// The two-phase composition create got no Location to save tasks to.
    #[error("composition create for '{0}' returned no location header")]
    MissingLocation(String),

    /// The configured base URL is invalid.
    #[error("invalid maestro url: {0}")]
    BadUrl(String),
}

impl MaestroError {
    /// Whether this is a "already exists" conflict the engine absorbs.
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_detectable() {
        assert!(MaestroError::Conflict("composition 'x'".to_string()).is_conflict());
        assert!(!MaestroError::MissingId("group".to_string()).is_conflict());
    }
}
