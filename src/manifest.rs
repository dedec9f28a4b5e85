use std::collections::HashMap;
use std::path::Path;
use std::{fs, io};

use serde::{Deserialize, Serialize};
use spdlog::{debug, error};
use url::Url;

use crate::error::{BlogError, Result};
use crate::fetch::{FetchRequest, Fetcher};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ManifestEntry {
    pub fn from_filename(filename: &str) -> Self {
        ManifestEntry {
            filename: filename.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn has_dates(&self) -> bool {
        self.created_at.is_some() || self.updated_at.is_some()
    }
}

/// A manifest may list a bare file name or a full entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Name(String),
    Entry(ManifestEntry),
}

impl From<RawEntry> for ManifestEntry {
    fn from(value: RawEntry) -> Self {
        match value {
            RawEntry::Name(filename) => ManifestEntry::from_filename(&filename),
            RawEntry::Entry(entry) => entry,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawManifest {
    #[serde(default)]
    files: Vec<RawEntry>,
}

pub fn parse_manifest(json: &str) -> Result<Vec<ManifestEntry>> {
    let manifest: RawManifest = serde_json::from_str(json)
        .map_err(|e| BlogError::ManifestNotFound(format!("invalid manifest: {}", e)))?;
    Ok(manifest.files.into_iter().map(ManifestEntry::from).collect())
}

/// Newest first by `created_at`, compared as strings. Entries without a date go last.
/// The sort is stable, so ties keep their manifest order.
pub fn sort_newest_first(entries: &mut [ManifestEntry]) {
    entries.sort_by(|a, b| {
        let da = a.created_at.as_deref().unwrap_or("");
        let db = b.created_at.as_deref().unwrap_or("");
        db.cmp(da)
    });
}

pub async fn fetch_manifest<F: Fetcher>(fetcher: &F, base: &Url) -> Result<Vec<ManifestEntry>> {
    let url = base.join(MANIFEST_FILE)
        .map_err(|e| BlogError::ManifestNotFound(e.to_string()))?;

    let body = match fetcher.fetch(FetchRequest::no_store(url)).await {
        Ok(body) => body,
        Err(e) => {
            error!("Error fetching manifest: {}", e);
            return Err(BlogError::ManifestNotFound(e.to_string()));
        }
    };

    let mut entries = parse_manifest(&body)?;
    sort_newest_first(&mut entries);
    debug!("Manifest lists {} posts", entries.len());
    Ok(entries)
}

/// Markdown files directly inside `dir`, sorted by name.
pub fn scan_posts_dir(dir: &Path) -> io::Result<Vec<String>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if file_name.ends_with(".md") {
                files.push(file_name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Rewrites `dir/manifest.json` to list every markdown file in `dir`.
/// Dates already recorded for a file are kept; removed files are dropped.
pub fn update_manifest(dir: &Path) -> Result<usize> {
    let manifest_path = dir.join(MANIFEST_FILE);

    let mut known: HashMap<String, ManifestEntry> = HashMap::new();
    if manifest_path.exists() {
        let current = fs::read_to_string(&manifest_path)?;
        for entry in parse_manifest(&current)? {
            known.insert(entry.filename.clone(), entry);
        }
    }

    let files: Vec<RawEntry> = scan_posts_dir(dir)?
        .into_iter()
        .map(|file_name| match known.remove(&file_name) {
            Some(entry) if entry.has_dates() => RawEntry::Entry(entry),
            _ => RawEntry::Name(file_name),
        })
        .collect();

    let count = files.len();
    let json = serde_json::to_string_pretty(&RawManifest { files })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&manifest_path, json)?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use crate::test_data::{MemoryFetcher, MANIFEST_DATA};

    use super::*;

    fn names(entries: &[ManifestEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.filename.as_str()).collect()
    }

    #[test]
    fn test_parse_mixed_entries() {
        let entries = parse_manifest(MANIFEST_DATA).unwrap();
        assert_eq!(names(&entries), ["old-post.md", "the-speed-to-fly.md", "fossil-fuels.md", "draft.md"]);
        assert_eq!(entries[1].created_at.as_deref(), Some("2026-02-02T03:44:38Z"));
        assert_eq!(entries[0], ManifestEntry::from_filename("old-post.md"));
    }

    #[test]
    fn test_parse_without_files() {
        assert!(parse_manifest("{}").unwrap().is_empty());
        assert!(parse_manifest(r#"{"files": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        let res = parse_manifest("not json");
        assert!(matches!(res, Err(BlogError::ManifestNotFound(_))));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut entries = parse_manifest(MANIFEST_DATA).unwrap();
        sort_newest_first(&mut entries);
        assert_eq!(names(&entries), ["the-speed-to-fly.md", "fossil-fuels.md", "old-post.md", "draft.md"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut entries = vec![];
        for name in ["a.md", "b.md", "c.md"] {
            let mut entry = ManifestEntry::from_filename(name);
            entry.created_at = Some("2026-01-01T00:00:00Z".to_string());
            entries.push(entry);
        }
        entries.push(ManifestEntry::from_filename("undated.md"));
        entries.insert(0, ManifestEntry::from_filename("first-undated.md"));

        sort_newest_first(&mut entries);
        assert_eq!(names(&entries), ["a.md", "b.md", "c.md", "first-undated.md", "undated.md"]);
    }

    #[tokio::test]
    async fn test_fetch_manifest_sorted() {
        let fetcher = MemoryFetcher::new().with("manifest.json", MANIFEST_DATA);
        let entries = fetch_manifest(&fetcher, &fetcher.base_url()).await.unwrap();
        assert_eq!(entries[0].filename, "the-speed-to-fly.md");
        assert!(fetcher.requested_no_store("manifest.json"));
    }

    #[tokio::test]
    async fn test_fetch_manifest_missing() {
        let fetcher = MemoryFetcher::new();
        let res = fetch_manifest(&fetcher, &fetcher.base_url()).await;
        assert!(matches!(res, Err(BlogError::ManifestNotFound(_))));
    }

    #[test]
    fn test_update_manifest_keeps_dates() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("riverblog-manifest-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("b-post.md"), "# B\n")?;
        fs::write(dir.join("a-post.md"), "# A\n")?;
        fs::write(dir.join("notes.txt"), "ignored")?;
        fs::write(dir.join(MANIFEST_FILE), r#"{"files": [
            {"filename": "b-post.md", "created_at": "2026-01-05T10:00:00Z"},
            "gone.md"
        ]}"#)?;

        let count = update_manifest(&dir)?;
        assert_eq!(count, 2);

        let entries = parse_manifest(&fs::read_to_string(dir.join(MANIFEST_FILE))?)?;
        assert_eq!(names(&entries), ["a-post.md", "b-post.md"]);
        assert_eq!(entries[0].created_at, None);
        assert_eq!(entries[1].created_at.as_deref(), Some("2026-01-05T10:00:00Z"));

        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
