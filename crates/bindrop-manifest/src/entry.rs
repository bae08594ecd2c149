use serde::Deserialize;

/// One manifest line: a logical path and where its content lives.
///
/// Deserializes from the drop service's wire shape
/// `{ "path": ..., "blob": { "id": ..., "url": ... } }`. Missing or null fields
/// become empty strings so that validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireFile")]
pub struct ManifestEntry {
    pub path: String,
    pub content_id: String,
    pub content_url: String,
}

impl ManifestEntry {
    pub fn new(
        path: impl Into<String>,
        content_id: impl Into<String>,
        content_url: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content_id: content_id.into(),
            content_url: content_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct WireFile {
    path: Option<String>,
    blob: Option<WireBlob>,
}

#[derive(Deserialize)]
struct WireBlob {
    id: Option<String>,
    url: Option<String>,
}

impl From<WireFile> for ManifestEntry {
    fn from(wire: WireFile) -> Self {
        let (content_id, content_url) = wire
            .blob
            .map(|b| (b.id.unwrap_or_default(), b.url.unwrap_or_default()))
            .unwrap_or_default();
        Self {
            path: wire.path.unwrap_or_default(),
            content_id,
            content_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_shape() {
        let json = r#"[
            {"path": "/bin/a.dll", "blob": {"id": "ABC", "url": "https://blob/abc"}},
            {"path": "/bin/b.dll", "blob": null},
            {"path": null, "blob": {"id": "DEF"}}
        ]"#;
        let entries: Vec<ManifestEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(
            entries[0],
            ManifestEntry::new("/bin/a.dll", "ABC", "https://blob/abc")
        );
        assert_eq!(entries[1], ManifestEntry::new("/bin/b.dll", "", ""));
        assert_eq!(entries[2], ManifestEntry::new("", "DEF", ""));
    }
}
