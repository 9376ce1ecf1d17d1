//! Classpath entries and their resolution order.
//!
//! A classpath is an ordered list of [`ClasspathEntry`] values pointing at
//! source folders, compiled-class directories or archives (`.jar`, `.zip`,
//! `.jmod`). Entries earlier in the list shadow later entries declaring the
//! same type, so the final order is load-bearing: entries are grouped into
//! four buckets (source dir, source archive, binary dir, binary archive) and
//! concatenated in that order, preserving insertion order inside each bucket.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entry Mode
// ============================================================================

/// Whether a classpath entry contains Java sources or compiled classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClasspathMode {
    /// `.java` files (a source folder or a sources archive).
    Source,
    /// `.class` files (a classes directory or a jar/zip/jmod archive).
    Binary,
}

impl fmt::Display for ClasspathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClasspathMode::Source => write!(f, "source"),
            ClasspathMode::Binary => write!(f, "binary"),
        }
    }
}

// ============================================================================
// Classpath Entry
// ============================================================================

/// A single, immutable classpath entry.
///
/// The path is validated for readability at registration time by the
/// environment builder; unreadable paths are silently dropped and never
/// become entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClasspathEntry {
    /// Absolute path of the folder or archive.
    pub path: PathBuf,
    /// Source or binary content.
    pub mode: ClasspathMode,
    /// Optional text encoding for reading source files. `None` means UTF-8.
    pub encoding: Option<String>,
}

impl ClasspathEntry {
    /// Creates a new entry. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>, mode: ClasspathMode, encoding: Option<String>) -> Self {
        ClasspathEntry {
            path: path.into(),
            mode,
            encoding,
        }
    }

    /// Returns true if the entry points at a directory (as opposed to an
    /// archive file).
    pub fn is_directory(&self) -> bool {
        self.path.is_dir()
    }

    /// Returns true if the entry is an archive with one of the supported
    /// extensions.
    pub fn is_archive(&self) -> bool {
        matches!(
            extension_of(&self.path).as_deref(),
            Some("jar") | Some("zip") | Some("jmod")
        )
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path.display(), self.mode)
    }
}

/// Lower-cased file extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

// ============================================================================
// Bucket Ordering
// ============================================================================

/// Number of resolution-order buckets.
pub const BUCKET_COUNT: usize = 4;

/// Computes the resolution-order bucket of an entry:
/// source dir (0), source archive (1), binary dir (2), binary archive (3).
pub fn bucket_of(entry: &ClasspathEntry) -> usize {
    let mut bucket = 0;
    if !entry.is_directory() {
        bucket += 1;
    }
    if entry.mode == ClasspathMode::Binary {
        bucket += 2;
    }
    bucket
}

/// Groups entries into buckets and concatenates them in bucket order,
/// preserving the incoming order within each bucket.
pub fn sort_entries(entries: Vec<ClasspathEntry>) -> Vec<ClasspathEntry> {
    let mut buckets: [Vec<ClasspathEntry>; BUCKET_COUNT] = Default::default();
    for entry in entries {
        let idx = bucket_of(&entry);
        buckets[idx].push(entry);
    }
    buckets.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_bucket_order_source_dirs_first() {
        let dir = TempDir::new().unwrap();
        let src_dir = dir.path().join("src");
        let bin_dir = dir.path().join("classes");
        let src_jar = dir.path().join("lib-sources.jar");
        let bin_jar = dir.path().join("lib.jar");
        fs::create_dir(&src_dir).unwrap();
        fs::create_dir(&bin_dir).unwrap();
        touch(&src_jar);
        touch(&bin_jar);

        let entries = vec![
            ClasspathEntry::new(&bin_jar, ClasspathMode::Binary, None),
            ClasspathEntry::new(&src_jar, ClasspathMode::Source, None),
            ClasspathEntry::new(&bin_dir, ClasspathMode::Binary, None),
            ClasspathEntry::new(&src_dir, ClasspathMode::Source, None),
        ];

        let sorted = sort_entries(entries);
        let buckets: Vec<usize> = sorted.iter().map(bucket_of).collect();
        assert_eq!(buckets, vec![0, 1, 2, 3]);
        assert_eq!(sorted[0].path, src_dir);
        assert_eq!(sorted[3].path, bin_jar);
    }

    #[test]
    fn test_bucket_order_is_stable_within_bucket() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();

        let entries = vec![
            ClasspathEntry::new(&b, ClasspathMode::Source, None),
            ClasspathEntry::new(&a, ClasspathMode::Source, None),
        ];

        let sorted = sort_entries(entries);
        // insertion order kept, not alphabetical
        assert_eq!(sorted[0].path, b);
        assert_eq!(sorted[1].path, a);
    }

    #[test]
    fn test_entry_json_round_trip() {
        let entry = ClasspathEntry::new("/repo/src/main/java", ClasspathMode::Source, None);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"mode\":\"source\""));
        let back: ClasspathEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn test_archive_detection() {
        assert!(ClasspathEntry::new("/x/foo.JAR", ClasspathMode::Binary, None).is_archive());
        assert!(ClasspathEntry::new("/x/foo.jmod", ClasspathMode::Binary, None).is_archive());
        assert!(!ClasspathEntry::new("/x/classes", ClasspathMode::Binary, None).is_archive());
    }
}
