use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("destination already exists: '{path}'")]
    AlreadyExists { path: PathBuf },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to remove '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("path has no parent directory: '{path}'")]
    NoParent { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The path the failed operation targeted.
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. }
            | Self::AlreadyExists { path }
            | Self::Write { path, .. }
            | Self::Read { path, .. }
            | Self::Remove { path, .. }
            | Self::NoParent { path } => path,
        }
    }

    pub fn is_already_exists(&self) -> bool { matches!(self, Self::AlreadyExists { .. }) }
}

/// Map an I/O error on a file being created, keeping `AlreadyExists` distinct.
pub fn from_create(path: &Path, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::AlreadyExists => Error::AlreadyExists {
            path: path.to_path_buf(),
        },
        _ => Error::Write {
            path: path.to_path_buf(),
            source: err,
        },
    }
}
