use crate::{Error, Result, from_create};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Create a new file for writing. Fails with [`Error::AlreadyExists`] if
/// anything is already present at `path`.
pub async fn create_new(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| from_create(path, e))
}

/// Copy `src` to a newly created `dest`, returning the number of bytes copied.
///
/// The destination is created exclusively. A copy that fails midway leaves
/// whatever was written in place; callers decide whether to clean up.
pub async fn copy_new(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let mut reader = File::open(src).await.map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;
    let mut writer = create_new(dest).await?;

    let copied = tokio::io::copy(&mut reader, &mut writer)
        .await
        .map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
    writer.flush().await.map_err(|e| Error::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(copied)
}

/// Remove a partially written file. Returns `false` if there was nothing to remove.
pub async fn remove_partial(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_new_refuses_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken.bin");
        std::fs::write(&path, b"original").unwrap();

        let err = create_new(&path).await.unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_copy_new_copies_bytes() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("dest.bin");
        std::fs::write(&src, b"shared content").unwrap();

        let copied = copy_new(&src, &dest).await.unwrap();
        assert_eq!(copied, 14);
        assert_eq!(std::fs::read(&dest).unwrap(), b"shared content");
    }

    #[tokio::test]
    async fn test_copy_new_missing_source() {
        let dir = tempdir().unwrap();
        let err = copy_new(dir.path().join("nope"), dir.path().join("dest"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(!dir.path().join("dest").exists());
    }

    #[tokio::test]
    async fn test_remove_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        std::fs::write(&path, b"half").unwrap();

        assert!(remove_partial(&path).await.unwrap());
        assert!(!path.exists());
        assert!(!remove_partial(&path).await.unwrap());
    }
}
