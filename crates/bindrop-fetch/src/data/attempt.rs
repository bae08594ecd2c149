use std::time::Duration;

use crate::error::Error;

/// States of a single download.
///
/// ```text
/// Attempting ─ok──────────────────────────────▶ Succeeded
///     │
///     └─err─▶ FailedAttempt ─(remove partial)─┬▶ Retrying ─(sleep)─▶ Attempting
///                                             ├▶ Exhausted   (transient, no budget left)
///                                             └▶ Rejected    (not transient)
/// ```
///
/// Every failure passes through `FailedAttempt`, which is where the partial
/// destination file is removed, so no terminal failure state leaves a file.
#[derive(Debug)]
pub enum AttemptState {
    /// Attempt number `attempt` (1-based) is in flight.
    Attempting { attempt: u32 },

    /// Attempt `attempt` failed. `partial` is set if it created the destination.
    FailedAttempt {
        attempt: u32,
        error: Error,
        partial: bool,
    },

    /// Waiting `delay` before starting attempt `attempt`.
    Retrying { attempt: u32, delay: Duration },

    Succeeded { attempts: u32, bytes: u64 },

    /// The retry budget ran out on a transient failure.
    Exhausted { attempts: u32, error: Error },

    /// A failure that retrying cannot fix.
    Rejected { attempts: u32, error: Error },
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded { .. } | Self::Exhausted { .. } | Self::Rejected { .. }
        )
    }
}

/// Result of a completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub attempts: u32,
    pub bytes: u64,
}
