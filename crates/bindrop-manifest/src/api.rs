use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use crate::entry::ManifestEntry;
use crate::error::{Error, Result};
use crate::root::RootFilter;
use crate::source::ManifestSource;

pub const MANIFEST_API_VERSION: &str = "2.0-preview";

const DROPS_SEGMENT: &str = "_apis/drop/drops";
const MANIFESTS_SEGMENT: &str = "_apis/drop/manifests";

/// Derive the manifest endpoint for a drop URI.
///
/// The `drops` API segment becomes `manifests`, the original query is
/// dropped and the manifest API version is requested.
pub fn manifest_uri(drop: &Url) -> Url {
    let mut uri = drop.clone();
    let path = drop.path().replace(DROPS_SEGMENT, MANIFESTS_SEGMENT);
    uri.set_path(&path);
    uri.set_query(None);
    uri.set_fragment(None);
    uri.query_pairs_mut()
        .append_pair("api-version", MANIFEST_API_VERSION);
    uri
}

/// Manifest source backed by the drop service REST API.
#[derive(Clone)]
pub struct DropApiClient {
    client: reqwest::Client,
    pat: Option<String>,
}

impl DropApiClient {
    /// Create a client authenticating with a personal access token, if given.
    pub fn new(pat: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Request {
                url: String::new(),
                source: e,
            })?;
        Ok(Self { client, pat })
    }

    pub fn with_client(client: reqwest::Client, pat: Option<String>) -> Self { Self { client, pat } }
}

impl ManifestSource for DropApiClient {
    type Error = Error;

    async fn fetch(&self, drop: &Url, root: &RootFilter) -> Result<Vec<ManifestEntry>> {
        let uri = manifest_uri(drop);
        debug!(url = %uri, "requesting manifest");

        let mut request = self.client.get(uri.clone());
        if let Some(pat) = &self.pat {
            request = request.basic_auth("", Some(pat));
        }

        let request_error = |source| Error::Request {
            url: uri.to_string(),
            source,
        };
        let entries: Vec<ManifestEntry> = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        let total = entries.len();
        let scoped = scope_to_root(entries, root);
        info!(
            total,
            scoped = scoped.len(),
            root = root.as_str(),
            "fetched manifest"
        );

        Ok(scoped)
    }
}

/// Keep the entries under `root`. Entries with a blank path are kept too, so
/// that indexing rejects them instead of them vanishing here.
fn scope_to_root(entries: Vec<ManifestEntry>, root: &RootFilter) -> Vec<ManifestEntry> {
    entries.into_iter().filter(|e| root.admits(&e.path)).collect()
}
