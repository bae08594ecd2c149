use std::path::PathBuf;

use crate::error::{Error, InvalidReason, Result};

/// The manifest path prefix that scopes a drop and is stripped from every
/// local destination.
///
/// Always stored with `/` separators, a leading `/` and a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFilter {
    prefix: String,
}

impl RootFilter {
    /// Normalize a caller-supplied root. `None` is a caller error.
    pub fn new(root: Option<&str>) -> Result<Self> {
        let root = root.ok_or(Error::MissingRootFilter)?;

        let mut prefix = root.replace('\\', "/");
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        Ok(Self { prefix })
    }

    pub fn as_str(&self) -> &str { &self.prefix }

    /// Whether a manifest path lies under this root (ASCII case-insensitive).
    pub fn contains(&self, path: &str) -> bool {
        let path = path.replace('\\', "/");
        strip_prefix_ignore_case(&path, &self.prefix).is_some()
    }

    /// Whether a manifest source should pass `path` on for indexing. Blank
    /// paths are admitted so that validation reports them.
    pub fn admits(&self, path: &str) -> bool { path.trim().is_empty() || self.contains(path) }

    /// The path of `manifest_path` below the root, as local path components.
    ///
    /// Both separator styles are accepted. Empty and `.` segments are dropped;
    /// a `..` segment is rejected so a destination can never leave the
    /// destination root.
    pub fn relative(&self, manifest_path: &str) -> std::result::Result<PathBuf, InvalidReason> {
        let normalized = manifest_path.replace('\\', "/");
        let rest = strip_prefix_ignore_case(&normalized, &self.prefix)
            .ok_or(InvalidReason::OutsideRoot)?;

        let mut relative = PathBuf::new();
        for segment in rest.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(InvalidReason::Traversal),
                s if s.contains(':') => return Err(InvalidReason::Traversal),
                s => relative.push(s),
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(InvalidReason::EmptyPath);
        }
        Ok(relative)
    }
}

fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &path[prefix.len()..])
}
