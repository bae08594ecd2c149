use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid drop location '{0}': expected an absolute URI")]
    InvalidDropLocation(String),

    #[error("a root filter is required")]
    MissingRootFilter,

    #[error("manifest request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("manifest contains no entries")]
    EmptyManifest,

    #[error("manifest contains {} invalid entr{}", invalid.len(), if invalid.len() == 1 { "y" } else { "ies" })]
    InvalidManifest { invalid: Vec<InvalidEntry> },

    #[error("index inconsistency: {paths} indexed paths but {grouped} paths across content groups")]
    IndexInconsistency { paths: usize, grouped: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a manifest entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    EmptyPath,
    EmptyContentId,
    EmptyContentUrl,
    OutsideRoot,
    Traversal,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EmptyPath => "empty path",
            Self::EmptyContentId => "empty content id",
            Self::EmptyContentUrl => "empty content url",
            Self::OutsideRoot => "path outside root filter",
            Self::Traversal => "path escapes destination",
        };
        f.write_str(s)
    }
}

/// A rejected manifest entry, by position in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntry {
    pub index: usize,
    pub path: String,
    pub content_url: String,
    pub reason: InvalidReason,
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} '{}' -> '{}': {}",
            self.index, self.path, self.content_url, self.reason
        )
    }
}
