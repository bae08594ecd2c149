use std::path::Path;
use std::sync::Arc;

use bindrop_fetch::HttpClient;
use bindrop_manifest::{
    DedupIndex, DropApiClient, ManifestSource, RootFilter, Url, parse_drop_location,
};
use tracing::info;

use crate::error::{DropError, Result};
use crate::materialize::{MaterializeSummary, Materializer};

/// An initialized drop: a validated manifest snapshot, ready to materialize.
///
/// A session can only be obtained through [`DropSession::initialize`], and
/// [`DropSession::materialize`] consumes it, so a drop is materialized at most
/// once per snapshot.
#[derive(Debug)]
pub struct DropSession {
    location: Url,
    index: Arc<DedupIndex>,
}

impl DropSession {
    /// Fetch and index the manifest of `drop_location`, scoped to `root`.
    ///
    /// Nothing is written to disk. Every error returned here is pre-flight.
    pub async fn initialize<S: ManifestSource>(
        drop_location: &str,
        root: Option<&str>,
        source: &S,
    ) -> Result<Self> {
        let location = parse_drop_location(drop_location)
            .map_err(|e| DropError::from_manifest(drop_location, e))?;
        let root =
            RootFilter::new(root).map_err(|e| DropError::from_manifest(location.as_str(), e))?;

        let entries = source
            .fetch(&location, &root)
            .await
            .map_err(|e| DropError::ManifestFetchFailed {
                location: location.to_string(),
                source: Box::new(e),
            })?;

        let index = DedupIndex::build(&entries, root)
            .map_err(|e| DropError::from_manifest(location.as_str(), e))?;

        Ok(Self {
            location,
            index: Arc::new(index),
        })
    }

    /// [`initialize`](Self::initialize) against the drop service REST API.
    pub async fn connect(
        drop_location: &str,
        root: Option<&str>,
        pat: Option<String>,
    ) -> Result<Self> {
        let source = DropApiClient::new(pat)
            .map_err(|e| DropError::from_manifest(drop_location, e))?;
        Self::initialize(drop_location, root, &source).await
    }

    pub fn location(&self) -> &Url { &self.location }

    pub fn index(&self) -> &DedupIndex { &self.index }

    pub fn file_count(&self) -> usize { self.index.file_count() }

    pub fn unique_count(&self) -> usize { self.index.unique_count() }

    /// Write every indexed path under `destination`.
    ///
    /// Existing files are never overwritten; a path that already exists fails
    /// its content group.
    pub async fn materialize<C: HttpClient + 'static>(
        self,
        materializer: &Materializer<C>,
        destination: impl AsRef<Path>,
    ) -> Result<MaterializeSummary> {
        let destination = destination.as_ref();
        info!(
            drop = %self.location,
            destination = %destination.display(),
            files = self.index.file_count(),
            unique = self.index.unique_count(),
            "materializing drop"
        );
        materializer.run(self.index, destination).await
    }
}
