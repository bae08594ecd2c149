use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::core::RetryPolicy;
use crate::data::{AttemptState, DownloadOutcome};
use crate::effects::http::HttpClient;
use crate::error::{Error, Result};

/// Downloads one URL into one new local file, retrying transient failures.
pub struct Downloader<C: HttpClient> {
    client: C,
    policy: RetryPolicy,
}

struct AttemptFailure {
    error: Error,
    partial: bool,
}

impl AttemptFailure {
    fn before_create(error: impl Into<Error>) -> Self {
        Self {
            error: error.into(),
            partial: false,
        }
    }

    fn after_create(error: impl Into<Error>) -> Self {
        Self {
            error: error.into(),
            partial: true,
        }
    }
}

impl<C: HttpClient> Downloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            policy: RetryPolicy::FIXED,
        }
    }

    pub fn client(&self) -> &C { &self.client }

    pub fn policy(&self) -> RetryPolicy { self.policy }

    /// Stream `url` into a newly created file at `destination`.
    ///
    /// `destination` must not exist and its parent directory must. On success
    /// the file holds the complete body; on failure no file is left behind
    /// unless one existed before the call, which is then left untouched.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    match self.attempt(url, destination).await {
                        Ok(bytes) => AttemptState::Succeeded {
                            attempts: attempt,
                            bytes,
                        },
                        Err(AttemptFailure { error, partial }) => AttemptState::FailedAttempt {
                            attempt,
                            error,
                            partial,
                        },
                    }
                }
                AttemptState::FailedAttempt {
                    attempt,
                    error,
                    partial,
                } => {
                    error!(
                        url,
                        path = %destination.display(),
                        attempt,
                        error = %error,
                        "download attempt failed"
                    );
                    if partial {
                        self.discard_partial(destination).await;
                    }
                    self.policy.after_cleanup(attempt, error)
                }
                AttemptState::Retrying { attempt, delay } => {
                    debug!(url, attempt, delay_secs = delay.as_secs(), "retrying download");
                    tokio::time::sleep(delay).await;
                    AttemptState::Attempting { attempt }
                }
                AttemptState::Succeeded { attempts, bytes } => {
                    debug!(url, path = %destination.display(), attempts, bytes, "download complete");
                    return Ok(DownloadOutcome { attempts, bytes });
                }
                AttemptState::Exhausted { attempts, error }
                | AttemptState::Rejected { attempts, error } => {
                    return Err(Error::DownloadFailed {
                        url: url.to_string(),
                        path: destination.to_path_buf(),
                        attempts,
                        source: Box::new(error),
                    });
                }
            };
        }
    }

    async fn attempt(&self, url: &str, destination: &Path) -> std::result::Result<u64, AttemptFailure> {
        let mut stream = self
            .client
            .stream(url)
            .await
            .map_err(AttemptFailure::before_create)?;

        let mut file = bindrop_fs::create_new(destination)
            .await
            .map_err(AttemptFailure::before_create)?;

        let mut bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AttemptFailure::after_create)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AttemptFailure::after_create(write_error(destination, e)))?;
            bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| AttemptFailure::after_create(write_error(destination, e)))?;

        Ok(bytes)
    }

    async fn discard_partial(&self, destination: &Path) {
        if let Err(e) = bindrop_fs::remove_partial(destination).await {
            warn!(path = %destination.display(), error = %e, "failed to remove partial download");
        }
    }
}

fn write_error(path: &Path, source: std::io::Error) -> bindrop_fs::Error {
    bindrop_fs::Error::Write {
        path: path.to_path_buf(),
        source,
    }
}
