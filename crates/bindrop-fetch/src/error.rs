//! Error types for bindrop-fetch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from '{url}'")]
    Status { url: String, status: u16 },

    #[error("request timeout")]
    Timeout,

    #[error(transparent)]
    Fs(#[from] bindrop_fs::Error),

    #[error("download '{url}' -> '{}' failed after {attempts} attempt(s): {source}", path.display())]
    DownloadFailed {
        url: String,
        path: PathBuf,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, error statuses, timeouts and local I/O errors are
    /// transient. A malformed URL or an already existing destination is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Status { .. } | Self::Timeout => true,
            Self::Fs(e) => matches!(
                e,
                bindrop_fs::Error::Write { .. } | bindrop_fs::Error::Read { .. } | bindrop_fs::Error::Remove { .. }
            ),
            Self::InvalidUrl(_) | Self::DownloadFailed { .. } => false,
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_builder() {
            Self::InvalidUrl(e.url().map_or_else(|| e.to_string(), |u| u.to_string()))
        } else if let Some(status) = e.status() {
            Self::Status {
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("reset".into()).is_transient());
        assert!(Error::Timeout.is_transient());
        assert!(
            Error::Status {
                url: "https://blob/x".into(),
                status: 503
            }
            .is_transient()
        );
        assert!(
            Error::Fs(bindrop_fs::Error::Write {
                path: "a".into(),
                source: std::io::Error::other("disk"),
            })
            .is_transient()
        );

        assert!(!Error::InvalidUrl("::".into()).is_transient());
        assert!(!Error::Fs(bindrop_fs::Error::AlreadyExists { path: "a".into() }).is_transient());
        assert!(
            !Error::Fs(bindrop_fs::Error::CreateDir {
                path: "a".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
            .is_transient()
        );
    }
}
