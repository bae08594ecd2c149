//! Materialize a remote build drop onto local storage.
//!
//! A drop manifest maps many logical paths onto fewer unique content blobs.
//! [`DropSession::initialize`] fetches and indexes the manifest;
//! [`DropSession::materialize`] then downloads each unique blob exactly once
//! and copies it to every other path that shares it.
//!
//! ```no_run
//! use bindrop::{DropApiClient, DropSession, Materializer, ReqwestClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = DropApiClient::new(Some("pat".into()))?;
//! let session = DropSession::initialize(
//!     "https://acct.example.com/_apis/drop/drops/build/42",
//!     Some("retail"),
//!     &source,
//! )
//! .await?;
//! let materializer = Materializer::new(ReqwestClient::new()?);
//! let summary = session.materialize(&materializer, "out").await?;
//! println!("{} files, {} unique", summary.files, summary.unique);
//! # Ok(())
//! # }
//! ```

mod error;
mod materialize;
mod options;
mod session;

pub use error::{DropError, FailureKind, GroupFailure, MaterializeError, Result};
pub use materialize::{MaterializeSummary, Materializer};
pub use options::MaterializeOptions;
pub use session::DropSession;

pub use bindrop_fetch::{Downloader, HttpClient, ReqwestClient};
pub use bindrop_manifest::{
    ContentGroup, DedupIndex, DropApiClient, ManifestEntry, ManifestSource, RootFilter,
};
