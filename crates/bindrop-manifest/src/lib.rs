//! Drop manifests and the deduplication index built from them.
//!
//! A manifest lists `(path, content id, content url)` entries. Many paths can
//! share one content id. [`DedupIndex`] validates a manifest snapshot and
//! derives two immutable views of it:
//!
//! - [`PathIndex`]: every accepted path and the URL its content comes from
//! - [`BlobIndex`]: one [`ContentGroup`] per content id, listing all paths
//!   that share it
//!
//! Remote manifests are obtained through the [`ManifestSource`] trait;
//! [`DropApiClient`] is the REST implementation.

mod api;
mod entry;
mod error;
mod index;
mod root;
mod source;

pub use api::{DropApiClient, MANIFEST_API_VERSION, manifest_uri};
pub use entry::ManifestEntry;
pub use error::{Error, InvalidEntry, InvalidReason, Result};
pub use index::{BlobIndex, ContentGroup, DedupIndex, IndexedPath, PathIndex};
pub use root::RootFilter;
pub use source::{ManifestSource, parse_drop_location};

pub use reqwest::Url;
