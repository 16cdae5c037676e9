//! Auth error types.

/// Errors from login, session artifact retrieval, or the artifact cache.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The remote service refused the credentials.
    #[error("login rejected for {username}: {reason}")]
    LoginRejected {
        /// Account the login was attempted for.
        username: String,
        /// Reason reported by the service.
        reason: String,
    },

    /// The login client could not be created or failed in transport.
    #[error("login client error: {0}")]
    Client(String),

    /// The cache backend failed.
    #[error("artifact cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejected_display() {
        let err = AuthError::LoginRejected {
            username: "alice".into(),
            reason: "bad password".into(),
        };
        assert_eq!(err.to_string(), "login rejected for alice: bad password");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AuthError::from(io_err);
        assert!(err.to_string().contains("gone"));
    }
}
