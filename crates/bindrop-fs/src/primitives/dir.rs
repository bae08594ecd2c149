use crate::{Error, Result};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating every missing level.
///
/// A directory that already exists, including one created concurrently by
/// another caller between the check and the create, is success.
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| Error::NoParent {
        path: path.to_path_buf(),
    })?;

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    match tokio::fs::create_dir_all(parent).await {
        Ok(()) => Ok(()),
        Err(_) if is_dir(parent).await => Ok(()),
        Err(e) => Err(Error::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        }),
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}
