use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::entry::ManifestEntry;
use crate::error::{Error, InvalidEntry, InvalidReason, Result};
use crate::root::RootFilter;

/// A manifest path together with its location below the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPath {
    path: String,
    relative: PathBuf,
}

impl IndexedPath {
    pub fn new(path: impl Into<String>, relative: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            relative: relative.into(),
        }
    }

    /// The path as it appeared in the manifest.
    pub fn path(&self) -> &str { &self.path }

    pub fn relative(&self) -> &Path { &self.relative }

    /// Where this path lands under `destination_root`.
    pub fn local(&self, destination_root: &Path) -> PathBuf { destination_root.join(&self.relative) }
}

#[derive(Debug, Clone)]
struct PathRecord {
    path: IndexedPath,
    url: String,
}

/// Accepted manifest paths, each mapped to the URL of its content.
///
/// Keyed by the case-folded path below the root, the same thing the local
/// destination is computed from, so two keys never share a destination.
#[derive(Debug)]
pub struct PathIndex {
    root: RootFilter,
    entries: HashMap<String, PathRecord>,
}

impl PathIndex {
    fn new(root: RootFilter) -> Self {
        Self {
            root,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Content URL for a manifest path. Spellings that land on the same
    /// local file (case, separators, `.` and empty segments) all match.
    pub fn url_for(&self, path: &str) -> Option<&str> {
        let key = path_key(&self.root.relative(path).ok()?);
        self.entries.get(&key).map(|r| r.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexedPath, &str)> {
        self.entries.values().map(|r| (&r.path, r.url.as_str()))
    }
}

/// All paths sharing one content id, downloaded once and copied to the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGroup {
    content_id: String,
    canonical_url: String,
    paths: Vec<IndexedPath>,
}

impl ContentGroup {
    pub fn new(
        content_id: impl Into<String>,
        canonical_url: impl Into<String>,
        paths: Vec<IndexedPath>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            canonical_url: canonical_url.into(),
            paths,
        }
    }

    pub fn content_id(&self) -> &str { &self.content_id }

    /// URL of the first path ever seen with this content id.
    pub fn canonical_url(&self) -> &str { &self.canonical_url }

    /// Paths in manifest order. The first is the download target.
    pub fn paths(&self) -> &[IndexedPath] { &self.paths }
}

/// Content groups keyed case-insensitively by content id, in first-seen order.
#[derive(Debug, Default)]
pub struct BlobIndex {
    groups: Vec<ContentGroup>,
    by_id: HashMap<String, usize>,
}

impl BlobIndex {
    pub fn len(&self) -> usize { self.groups.len() }

    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    pub fn get(&self, content_id: &str) -> Option<&ContentGroup> {
        self.by_id.get(&fold(content_id)).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentGroup> { self.groups.iter() }

    pub fn groups(&self) -> &[ContentGroup] { &self.groups }

    /// Total number of paths across all groups.
    pub fn grouped_paths(&self) -> usize { self.groups.iter().map(|g| g.paths.len()).sum() }
}

/// Immutable path and content indices over one manifest snapshot.
#[derive(Debug)]
pub struct DedupIndex {
    root: RootFilter,
    paths: PathIndex,
    blobs: BlobIndex,
}

impl DedupIndex {
    /// Validate every entry, then index them all.
    ///
    /// Duplicate paths keep their first occurrence; later ones are dropped
    /// without error and never reach a content group.
    pub fn build(entries: &[ManifestEntry], root: RootFilter) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptyManifest);
        }

        let relatives = validate(entries, &root)?;

        let mut paths = PathIndex::new(root.clone());
        let mut blobs = BlobIndex::default();

        for (entry, relative) in entries.iter().zip(relatives) {
            debug!(path = %entry.path, url = %entry.content_url, "indexing");

            let slot = match paths.entries.entry(path_key(&relative)) {
                Entry::Occupied(_) => {
                    debug!(path = %entry.path, "duplicate path dropped, keeping first occurrence");
                    continue;
                }
                Entry::Vacant(slot) => slot,
            };

            let indexed = IndexedPath::new(entry.path.clone(), relative);
            slot.insert(PathRecord {
                path: indexed.clone(),
                url: entry.content_url.clone(),
            });

            match blobs.by_id.entry(fold(&entry.content_id)) {
                Entry::Occupied(group) => blobs.groups[*group.get()].paths.push(indexed),
                Entry::Vacant(group) => {
                    group.insert(blobs.groups.len());
                    blobs.groups.push(ContentGroup::new(
                        entry.content_id.clone(),
                        entry.content_url.clone(),
                        vec![indexed],
                    ));
                }
            }
        }

        check_consistency(&paths, &blobs)?;
        info!(
            files = paths.len(),
            unique = blobs.len(),
            "found {} files, {} unique",
            paths.len(),
            blobs.len()
        );

        Ok(Self { root, paths, blobs })
    }

    pub fn root(&self) -> &RootFilter { &self.root }

    pub fn paths(&self) -> &PathIndex { &self.paths }

    pub fn blobs(&self) -> &BlobIndex { &self.blobs }

    pub fn file_count(&self) -> usize { self.paths.len() }

    pub fn unique_count(&self) -> usize { self.blobs.len() }
}

/// ASCII case folding, the same rule [`RootFilter`] matches with.
fn fold(s: &str) -> String { s.to_ascii_lowercase() }

fn path_key(relative: &Path) -> String {
    let segments: Vec<String> = relative
        .iter()
        .map(|segment| fold(&segment.to_string_lossy()))
        .collect();
    segments.join("/")
}

fn blank(s: &str) -> bool { s.trim().is_empty() }

/// First pass: check every entry, logging each offender. Returns the
/// root-relative path of every entry when all are valid.
fn validate(entries: &[ManifestEntry], root: &RootFilter) -> Result<Vec<PathBuf>> {
    let mut relatives = Vec::with_capacity(entries.len());
    let mut invalid = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let checked = if blank(&entry.path) {
            Err(InvalidReason::EmptyPath)
        } else if blank(&entry.content_id) {
            Err(InvalidReason::EmptyContentId)
        } else if blank(&entry.content_url) {
            Err(InvalidReason::EmptyContentUrl)
        } else {
            root.relative(&entry.path)
        };

        match checked {
            Ok(relative) => relatives.push(relative),
            Err(reason) => {
                error!(
                    index,
                    path = %entry.path,
                    url = %entry.content_url,
                    %reason,
                    "invalid manifest entry"
                );
                invalid.push(InvalidEntry {
                    index,
                    path: entry.path.clone(),
                    content_url: entry.content_url.clone(),
                    reason,
                });
            }
        }
    }

    if invalid.is_empty() {
        Ok(relatives)
    } else {
        Err(Error::InvalidManifest { invalid })
    }
}

fn check_consistency(paths: &PathIndex, blobs: &BlobIndex) -> Result<()> {
    let grouped = blobs.grouped_paths();
    if grouped != paths.len() {
        return Err(Error::IndexInconsistency {
            paths: paths.len(),
            grouped,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> RootFilter { RootFilter::new(Some("/drop")).unwrap() }

    fn entry(path: &str, id: &str) -> ManifestEntry {
        ManifestEntry::new(path, id, format!("https://blob/{id}{path}"))
    }

    #[test]
    fn test_empty_manifest() {
        assert!(matches!(DedupIndex::build(&[], root()), Err(Error::EmptyManifest)));
    }

    #[test]
    fn test_groups_shared_content() {
        let entries = vec![
            entry("/drop/a.dll", "X"),
            entry("/drop/b/a.dll", "X"),
            entry("/drop/c.dll", "Y"),
            entry("/drop/d/a.dll", "x"),
        ];
        let index = DedupIndex::build(&entries, root()).unwrap();

        assert_eq!(index.file_count(), 4);
        assert_eq!(index.unique_count(), 2);

        let x = index.blobs().get("X").unwrap();
        assert_eq!(x.canonical_url(), "https://blob/X/drop/a.dll");
        let paths: Vec<&str> = x.paths().iter().map(IndexedPath::path).collect();
        assert_eq!(paths, vec!["/drop/a.dll", "/drop/b/a.dll", "/drop/d/a.dll"]);

        let first: Vec<&str> = index.blobs().iter().map(ContentGroup::content_id).collect();
        assert_eq!(first, vec!["X", "Y"]);
    }

    #[test]
    fn test_duplicate_path_first_wins() {
        let entries = vec![
            entry("/drop/a.dll", "X"),
            entry("/DROP/A.DLL", "Y"),
            entry("\\drop\\a.dll", "Z"),
        ];
        let index = DedupIndex::build(&entries, root()).unwrap();

        assert_eq!(index.file_count(), 1);
        assert_eq!(index.unique_count(), 1);
        assert_eq!(index.paths().url_for("/Drop/A.dll"), Some("https://blob/X/drop/a.dll"));
        assert!(index.blobs().get("Y").is_none());
        assert_eq!(index.blobs().grouped_paths(), index.file_count());
    }

    #[test]
    fn test_equivalent_spellings_share_one_destination() {
        let entries = vec![
            entry("/drop/a/b.bin", "ONE"),
            entry("/drop/a//b.bin", "TWO"),
            entry("/drop/./a/b.bin", "THREE"),
            entry("/drop\\A\\.\\B.BIN", "FOUR"),
        ];
        let index = DedupIndex::build(&entries, root()).unwrap();

        assert_eq!(index.file_count(), 1);
        assert_eq!(index.unique_count(), 1);
        assert_eq!(index.blobs().groups()[0].content_id(), "ONE");
        assert_eq!(
            index.paths().url_for("/drop/a/./b.bin"),
            Some("https://blob/ONE/drop/a/b.bin")
        );
        assert_eq!(index.blobs().grouped_paths(), index.file_count());
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let entries = vec![
            entry("/drop/\u{c9}t\u{e9}.txt", "\u{c9}X"),
            entry("/drop/\u{e9}t\u{e9}.txt", "\u{e9}x"),
        ];
        let index = DedupIndex::build(&entries, root()).unwrap();

        assert_eq!(index.file_count(), 2);
        assert_eq!(index.unique_count(), 2);
        assert_eq!(index.blobs().get("\u{c9}x").unwrap().content_id(), "\u{c9}X");
        assert_eq!(index.blobs().get("\u{e9}X").unwrap().content_id(), "\u{e9}x");
    }

    #[test]
    fn test_invalid_entries_reported_together() {
        let entries = vec![
            entry("/drop/ok.dll", "X"),
            ManifestEntry::new("  ", "X", "https://blob/x"),
            ManifestEntry::new("/drop/b.dll", "", "https://blob/x"),
            ManifestEntry::new("/drop/c.dll", "Y", "\t"),
            entry("/elsewhere/d.dll", "Z"),
        ];
        let Err(Error::InvalidManifest { invalid }) = DedupIndex::build(&entries, root()) else {
            panic!("expected InvalidManifest");
        };

        let reasons: Vec<(usize, InvalidReason)> =
            invalid.iter().map(|e| (e.index, e.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, InvalidReason::EmptyPath),
                (2, InvalidReason::EmptyContentId),
                (3, InvalidReason::EmptyContentUrl),
                (4, InvalidReason::OutsideRoot),
            ]
        );
    }

    #[test]
    fn test_local_path_under_destination() {
        let entries = vec![entry("/drop/x/y/z.txt", "A")];
        let index = DedupIndex::build(&entries, root()).unwrap();
        let group = &index.blobs().groups()[0];

        let local = group.paths()[0].local(Path::new("/out"));
        assert_eq!(local, Path::new("/out").join("x").join("y").join("z.txt"));
    }

    #[test]
    fn test_consistency_check_detects_mismatch() {
        let mut paths = PathIndex::new(root());
        paths.entries.insert(
            "a".into(),
            PathRecord {
                path: IndexedPath::new("/drop/a", "a"),
                url: "u".into(),
            },
        );
        let blobs = BlobIndex::default();

        assert!(matches!(
            check_consistency(&paths, &blobs),
            Err(Error::IndexInconsistency { paths: 1, grouped: 0 })
        ));
    }
}
