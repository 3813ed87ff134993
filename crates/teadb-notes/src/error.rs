use std::time::Duration;

use teadb_core::Transient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by completion API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("completion API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unparseable completion response: {0}")]
    Parse(String),
}

impl Transient for NotesError {
    fn is_transient(&self) -> bool {
        match self {
            NotesError::RateLimited { .. } => true,
            NotesError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NotesError::Api { status, .. } => *status >= 500,
            NotesError::MissingApiKey | NotesError::Parse(_) => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            NotesError::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_retry_auth_errors_do_not() {
        let server = NotesError::Api {
            status: 502,
            body: "bad gateway".to_owned(),
        };
        let auth = NotesError::Api {
            status: 401,
            body: "invalid key".to_owned(),
        };
        assert!(server.is_transient());
        assert!(!auth.is_transient());
        assert!(NotesError::RateLimited {
            retry_after_secs: 1
        }
        .is_transient());
        assert!(!NotesError::Parse("x".to_owned()).is_transient());
    }

    #[test]
    fn rate_limit_carries_its_retry_after() {
        let err = NotesError::RateLimited {
            retry_after_secs: 7,
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(NotesError::MissingApiKey.retry_after(), None);
    }
}
