use std::future::Future;

use reqwest::Url;

use crate::entry::ManifestEntry;
use crate::error::{Error, Result};
use crate::root::RootFilter;

/// Something that can list the entries of a drop.
///
/// Implementations own transport, authentication and API versioning. The
/// entries they return are validated by [`DedupIndex`](crate::DedupIndex),
/// not here.
pub trait ManifestSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        drop: &Url,
        root: &RootFilter,
    ) -> impl Future<Output = std::result::Result<Vec<ManifestEntry>, Self::Error>> + Send;
}

/// Parse a drop location, which must be an absolute hierarchical URI.
pub fn parse_drop_location(location: &str) -> Result<Url> {
    let url = Url::parse(location.trim())
        .map_err(|_| Error::InvalidDropLocation(location.to_string()))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidDropLocation(location.to_string()));
    }
    Ok(url)
}
