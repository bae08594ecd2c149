//! Immutable data types describing download attempts.

mod attempt;

pub use attempt::{AttemptState, DownloadOutcome};
