//! Blob downloading for drop materialization.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable attempt and outcome types
//! - [`core`] - Pure retry schedule and state transitions
//! - `effects` - Network and file I/O behind the [`HttpClient`] trait
//!
//! A download streams the response body straight into an exclusively created
//! destination file. Transient failures remove whatever the failed attempt
//! wrote and retry on a fixed exponential schedule (2, 4, 8, 16, 32 seconds).

pub mod core;
pub mod data;
mod effects;
mod error;

pub use self::core::{RetryPolicy, retry_delay};
pub use self::data::{AttemptState, DownloadOutcome};
pub use self::effects::{BoxStream, Downloader, HttpClient};

#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestClient;

pub use self::error::{Error, Result};
