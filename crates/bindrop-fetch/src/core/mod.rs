//! Pure transformations for downloading.
//!
//! Nothing in here touches the network or the filesystem; the download
//! driver in `effects` asks these functions what to do next.

mod retry;

pub use retry::{RetryPolicy, retry_delay};
