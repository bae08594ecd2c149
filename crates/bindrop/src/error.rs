use std::path::PathBuf;

use bindrop_manifest::InvalidEntry;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DropError {
    #[error("invalid drop location '{0}'")]
    InvalidDropLocation(String),

    #[error("a root filter is required")]
    MissingRootFilter,

    #[error("not able to get build manifest for '{location}': {source}")]
    ManifestFetchFailed {
        location: String,
        #[source]
        source: BoxError,
    },

    #[error("encountered empty build drop '{location}'")]
    EmptyManifest { location: String },

    #[error("build drop '{location}' has {} invalid entr{}", invalid.len(), if invalid.len() == 1 { "y" } else { "ies" })]
    InvalidManifest {
        location: String,
        invalid: Vec<InvalidEntry>,
    },

    #[error("index inconsistency: {paths} paths indexed but {grouped} paths grouped by content")]
    IndexInconsistency { paths: usize, grouped: usize },

    #[error("failed to prepare directory for '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: bindrop_fs::Error,
    },

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

pub type Result<T> = std::result::Result<T, DropError>;

impl DropError {
    /// `true` if the error was raised before anything was written to disk.
    pub fn is_preflight(&self) -> bool {
        !matches!(self, Self::CreateDirectory { .. } | Self::Materialize(_))
    }

    pub(crate) fn from_manifest(location: &str, err: bindrop_manifest::Error) -> Self {
        use bindrop_manifest::Error as E;

        match err {
            E::InvalidDropLocation(s) => Self::InvalidDropLocation(s),
            E::MissingRootFilter => Self::MissingRootFilter,
            E::EmptyManifest => Self::EmptyManifest {
                location: location.to_string(),
            },
            E::InvalidManifest { invalid } => Self::InvalidManifest {
                location: location.to_string(),
                invalid,
            },
            E::IndexInconsistency { paths, grouped } => Self::IndexInconsistency { paths, grouped },
            e @ E::Request { .. } => Self::ManifestFetchFailed {
                location: location.to_string(),
                source: Box::new(e),
            },
        }
    }
}

/// One or more content groups failed during materialization. Files written by
/// the groups that succeeded remain on disk.
#[derive(Debug, Error)]
#[error("{} of {total} content groups failed to materialize", failures.len())]
pub struct MaterializeError {
    pub total: usize,
    pub failures: Vec<GroupFailure>,
}

#[derive(Debug, Error)]
#[error("content '{content_id}': {kind}")]
pub struct GroupFailure {
    pub content_id: String,
    pub kind: FailureKind,
}

#[derive(Debug, Error)]
pub enum FailureKind {
    #[error(transparent)]
    DownloadFailed(bindrop_fetch::Error),

    #[error("copy '{}' -> '{}' failed: {source}", from.display(), to.display())]
    LocalCopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: bindrop_fs::Error,
    },

    #[error("content group has no paths")]
    EmptyContentGroup,

    #[error("task aborted: {0}")]
    Aborted(String),
}
