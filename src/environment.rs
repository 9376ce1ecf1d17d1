//! Classpath-backed type index.
//!
//! An [`Environment`] is built once from a classpath description and then
//! answers type lookups by fully qualified name. Lookups are memoized per
//! name; concurrent first reads converge on a single computation. The
//! environment is scoped: it closes on drop (or explicitly), and every query
//! after close fails with [`ForgeError::EnvironmentClosed`].
//!
//! ## Resolution order
//!
//! 1. in-memory compilation unit overrides
//! 2. classpath entries in bucket order (source dirs, source archives,
//!    binary dirs, binary archives), insertion order within a bucket
//!
//! Nested types resolve through their outermost compilation unit; both the
//! dotted (`a.b.Outer.Inner`) and the binary (`a.b.Outer$Inner`) form are
//! accepted.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::archive::Archive;
use crate::classfile;
use crate::classpath::{sort_entries, ClasspathEntry, ClasspathMode};
use crate::error::{ForgeError, ForgeResult};
use crate::model::TypeDecl;
use crate::names;
use crate::parse;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder assembling the classpath of an [`Environment`].
///
/// Paths are collected eagerly but validated and filtered only in
/// [`build`](EnvironmentBuilder::build), so excludes apply no matter when
/// they are registered. Unreadable paths are dropped silently.
#[derive(Debug)]
pub struct EnvironmentBuilder {
    current_dir: PathBuf,
    paths: Vec<(PathBuf, ClasspathMode)>,
    /// Exclude patterns keyed by their literal pattern text. `include`
    /// removes by text equality, not by pattern semantics.
    excludes: HashMap<String, ()>,
    /// Excludes applied to source paths and source attachments only.
    source_excludes: HashMap<String, ()>,
    use_running_classpath: bool,
    include_sources: bool,
    parse_method_bodies: bool,
    java_home: Option<PathBuf>,
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        EnvironmentBuilder::new()
    }
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        EnvironmentBuilder {
            current_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            paths: Vec::new(),
            excludes: HashMap::new(),
            source_excludes: HashMap::new(),
            use_running_classpath: true,
            include_sources: true,
            parse_method_bodies: false,
            java_home: None,
        }
    }

    /// Anchors relative folders at `dir` instead of the process working
    /// directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = dir.into();
        self
    }

    /// Adds a source folder relative to the current directory.
    pub fn with_source_folder(mut self, rel: impl AsRef<Path>) -> Self {
        let path = self.current_dir.join(rel.as_ref());
        self.paths.push((path, ClasspathMode::Source));
        self
    }

    /// Adds a compiled-classes folder relative to the current directory.
    pub fn with_classes_folder(mut self, rel: impl AsRef<Path>) -> Self {
        let path = self.current_dir.join(rel.as_ref());
        self.paths.push((path, ClasspathMode::Binary));
        self
    }

    /// Adds an absolute source folder or sources archive.
    pub fn with_absolute_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push((path.into(), ClasspathMode::Source));
        self
    }

    /// Adds an absolute classes folder or binary archive.
    pub fn with_absolute_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push((path.into(), ClasspathMode::Binary));
        self
    }

    /// Excludes every path whose `/`-separated full text matches `pattern`
    /// (case-insensitive, whole match).
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.insert(pattern.into(), ());
        self
    }

    /// Excludes every path containing the literal fragment.
    pub fn exclude_if_contains(self, fragment: &str) -> Self {
        self.exclude(format!(".*{}.*", regex::escape(fragment)))
    }

    /// Removes a previously registered exclude. Matching is by pattern text
    /// equality, two patterns with identical semantics but different text do
    /// not cancel each other.
    pub fn include(mut self, pattern: &str) -> Self {
        self.excludes.remove(pattern);
        self.source_excludes.remove(pattern);
        self
    }

    /// Excludes matching paths from the source side only; binaries still
    /// resolve, their types just come without source.
    pub fn without_sources(mut self, pattern: impl Into<String>) -> Self {
        self.source_excludes.insert(pattern.into(), ());
        self
    }

    /// Whether to append the running VM classpath (`$CLASSPATH` plus the
    /// java home's platform archives). On by default.
    pub fn with_running_classpath(mut self, enabled: bool) -> Self {
        self.use_running_classpath = enabled;
        self
    }

    /// Whether to attach source folders and `-sources` archives for binary
    /// entries. On by default.
    pub fn with_sources_included(mut self, enabled: bool) -> Self {
        self.include_sources = enabled;
        self
    }

    /// Whether parsed methods retain their raw body text. Off by default.
    pub fn with_parse_method_bodies(mut self, enabled: bool) -> Self {
        self.parse_method_bodies = enabled;
        self
    }

    /// Overrides the java home used for the platform archives. Defaults to
    /// `$JAVA_HOME`.
    pub fn with_java_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.java_home = Some(path.into());
        self
    }

    /// Validates, filters, dedups and orders the collected paths, then
    /// constructs the environment.
    pub fn build(self) -> ForgeResult<Environment> {
        let excludes = compile_patterns(&self.excludes)?;
        let source_excludes = compile_patterns(&self.source_excludes)?;

        let mut candidates = self.paths;
        if self.use_running_classpath {
            candidates.extend(running_classpath(self.java_home.as_deref()));
        }

        let mut accepted: Vec<ClasspathEntry> = Vec::new();
        let push = |entry: ClasspathEntry, accepted: &mut Vec<ClasspathEntry>| {
            if !accepted.contains(&entry) {
                accepted.push(entry);
            }
        };

        for (path, mode) in candidates {
            if fs::metadata(&path).is_err() {
                tracing::debug!(path = %path.display(), "dropping unreadable classpath path");
                continue;
            }
            if is_excluded(&path, &excludes) {
                continue;
            }
            if mode == ClasspathMode::Source && is_excluded(&path, &source_excludes) {
                continue;
            }
            let entry = ClasspathEntry::new(&path, mode, None);
            if mode == ClasspathMode::Binary && self.include_sources {
                for attachment in source_attachments(&path) {
                    if fs::metadata(&attachment).is_err() {
                        continue;
                    }
                    if is_excluded(&attachment, &excludes)
                        || is_excluded(&attachment, &source_excludes)
                    {
                        continue;
                    }
                    push(
                        ClasspathEntry::new(&attachment, ClasspathMode::Source, None),
                        &mut accepted,
                    );
                }
            }
            push(entry, &mut accepted);
        }

        let entries = sort_entries(accepted);
        tracing::debug!(entry_count = entries.len(), "environment classpath assembled");
        Ok(Environment::new(entries, self.parse_method_bodies))
    }

    /// Builds the environment, runs `f` against it and closes it afterwards,
    /// also on error (and on panic, via close-on-drop).
    pub fn run<T>(self, f: impl FnOnce(&Environment) -> ForgeResult<T>) -> ForgeResult<T> {
        let env = self.build()?;
        let result = f(&env);
        env.close();
        result
    }
}

fn compile_patterns(patterns: &HashMap<String, ()>) -> ForgeResult<Vec<Regex>> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns.keys() {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(true)
            .build()
            .map_err(|e| ForgeError::Config {
                message: format!("invalid exclude pattern '{pattern}': {e}"),
            })?;
        compiled.push(regex);
    }
    Ok(compiled)
}

fn is_excluded(path: &Path, patterns: &[Regex]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let text = path.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|p| p.is_match(&text))
}

/// Source attachment candidates for an accepted binary path, following the
/// Maven output layout.
fn source_attachments(binary: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if binary.is_dir() {
        if binary.ends_with("target/classes") {
            if let Some(module_root) = binary.parent().and_then(Path::parent) {
                out.push(module_root.join(names::MAIN_JAVA_SOURCE_FOLDER));
                out.push(module_root.join(names::GENERATED_ANNOTATIONS_SOURCE_FOLDER));
                out.push(module_root.join(names::GENERATED_WS_IMPORT_SOURCE_FOLDER));
            }
        } else if binary.ends_with("target/test-classes") {
            if let Some(module_root) = binary.parent().and_then(Path::parent) {
                out.push(module_root.join(names::TEST_JAVA_SOURCE_FOLDER));
            }
        }
    } else if let (Some(stem), Some(ext)) = (
        binary.file_stem().and_then(|s| s.to_str()),
        crate::classpath::extension_of(binary),
    ) {
        if ext == "jar" || ext == "zip" {
            if let Some(parent) = binary.parent() {
                out.push(parent.join(format!("{stem}-sources.{ext}")));
            }
        }
    }
    out
}

/// Classpath of the running VM: `$CLASSPATH` split on the platform
/// separator, plus the platform archives of the java home.
fn running_classpath(java_home: Option<&Path>) -> Vec<(PathBuf, ClasspathMode)> {
    let mut out = Vec::new();
    if let Some(var) = std::env::var_os("CLASSPATH") {
        for path in std::env::split_paths(&var) {
            if !path.as_os_str().is_empty() {
                out.push((path, ClasspathMode::Binary));
            }
        }
    }

    let home = java_home
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("JAVA_HOME").map(PathBuf::from));
    if let Some(home) = home {
        let jmods = home.join("jmods");
        if let Ok(read) = fs::read_dir(&jmods) {
            let mut mods: Vec<PathBuf> = read
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| crate::classpath::extension_of(p).as_deref() == Some("jmod"))
                .collect();
            mods.sort();
            out.extend(mods.into_iter().map(|p| (p, ClasspathMode::Binary)));
        } else {
            let rt = home.join("lib").join("rt.jar");
            if rt.is_file() {
                out.push((rt, ClasspathMode::Binary));
            }
        }
    }
    out
}

/// File stem of a top-level declared type, filtering nested (`Outer$Inner`)
/// and synthetic (`package-info`, `module-info`) units.
fn declared_type_stem(file_name: &str, extension: &str) -> Option<String> {
    let stem = file_name.strip_suffix(extension)?;
    if stem.is_empty() || stem.contains(names::INNER_SEP) {
        return None;
    }
    if stem == "package-info" || stem == "module-info" {
        return None;
    }
    Some(stem.to_string())
}

// ============================================================================
// Environment
// ============================================================================

type MemoCell = Arc<OnceLock<Option<Arc<TypeDecl>>>>;

/// A classpath-backed, memoizing type index.
pub struct Environment {
    entries: Vec<ClasspathEntry>,
    parse_method_bodies: bool,
    /// Per-FQN memo cells. The cell is shared out under the read lock so a
    /// slow computation never holds the map.
    memo: RwLock<HashMap<String, MemoCell>>,
    /// Lazily opened archives, keyed by path. An archive that fails to open
    /// is recorded as `None` and skipped from then on.
    archives: RwLock<HashMap<PathBuf, Option<Arc<Archive>>>>,
    /// In-memory compilation units shadowing the classpath, keyed by
    /// `(package, file name)`.
    overrides: RwLock<HashMap<(String, String), String>>,
    closed: AtomicBool,
}

impl Environment {
    fn new(entries: Vec<ClasspathEntry>, parse_method_bodies: bool) -> Self {
        Environment {
            entries,
            parse_method_bodies,
            memo: RwLock::new(HashMap::new()),
            archives: RwLock::new(HashMap::new()),
            overrides: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// The classpath in resolution order.
    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the environment and releases caches. Idempotent; also runs on
    /// drop.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.memo.write().expect("memo lock poisoned").clear();
        self.archives.write().expect("archive lock poisoned").clear();
        tracing::debug!("environment closed");
    }

    fn ensure_open(&self) -> ForgeResult<()> {
        if self.is_closed() {
            Err(ForgeError::EnvironmentClosed)
        } else {
            Ok(())
        }
    }

    /// Looks up a type by fully qualified name. Unknown types are `Ok(None)`,
    /// never an error; classpath damage along the way is skipped with a debug
    /// log.
    pub fn find_type(&self, fqn: &str) -> ForgeResult<Option<Arc<TypeDecl>>> {
        self.ensure_open()?;
        let cell = self.memo_cell(fqn);
        let value = cell.get_or_init(|| self.compute_type(fqn));
        Ok(value.clone())
    }

    /// Like [`find_type`](Environment::find_type), but a miss is an error.
    pub fn require_type(&self, fqn: &str) -> ForgeResult<Arc<TypeDecl>> {
        self.find_type(fqn)?.ok_or_else(|| ForgeError::TypeNotFound {
            fqn: fqn.to_string(),
        })
    }

    /// Drops all memoized type data while keeping the classpath. The next
    /// lookup recomputes from disk and overrides.
    pub fn reload(&self) -> ForgeResult<()> {
        self.ensure_open()?;
        self.memo.write().expect("memo lock poisoned").clear();
        tracing::debug!("environment reloaded");
        Ok(())
    }

    /// Registers an in-memory compilation unit shadowing the classpath.
    /// Returns true when the content differs from what was registered before,
    /// i.e. when a [`reload`](Environment::reload) is needed for queries to
    /// see the change.
    pub fn register_override(
        &self,
        package: &str,
        file_name: &str,
        source: &str,
    ) -> ForgeResult<bool> {
        self.ensure_open()?;
        let key = (package.to_string(), file_name.to_string());
        let mut overrides = self.overrides.write().expect("override lock poisoned");
        let changed = overrides.get(&key).map(String::as_str) != Some(source);
        overrides.insert(key, source.to_string());
        Ok(changed)
    }

    /// Fully qualified names of the top-level types declared directly in
    /// `package`, collected across overrides and every classpath entry,
    /// deduplicated and sorted. Drives batch operations that fan out over a
    /// package.
    pub fn types_in_package(&self, package: &str) -> ForgeResult<Vec<String>> {
        self.ensure_open()?;
        let rel_dir = format!("{}/", package.replace(names::DOT, "/"));
        let mut found: BTreeSet<String> = BTreeSet::new();

        {
            let overrides = self.overrides.read().expect("override lock poisoned");
            for (pkg, file_name) in overrides.keys() {
                if pkg == package {
                    if let Some(stem) = file_name.strip_suffix(".java") {
                        found.insert(format!("{package}.{stem}"));
                    }
                }
            }
        }

        for entry in &self.entries {
            let extension = match entry.mode {
                ClasspathMode::Source => ".java",
                ClasspathMode::Binary => ".class",
            };
            if entry.is_directory() {
                let dir = entry.path.join(package.replace(names::DOT, std::path::MAIN_SEPARATOR_STR));
                for file in WalkDir::new(&dir)
                    .min_depth(1)
                    .max_depth(1)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file())
                {
                    if let Some(stem) = declared_type_stem(&file.file_name().to_string_lossy(), extension) {
                        found.insert(format!("{package}.{stem}"));
                    }
                }
            } else if let Some(archive) = self.open_archive(&entry.path) {
                for name in archive.entries_under(&rel_dir) {
                    let file_name = &name[rel_dir.len()..];
                    if let Some(stem) = declared_type_stem(file_name, extension) {
                        found.insert(format!("{package}.{stem}"));
                    }
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    fn memo_cell(&self, fqn: &str) -> MemoCell {
        if let Some(cell) = self.memo.read().expect("memo lock poisoned").get(fqn) {
            return cell.clone();
        }
        self.memo
            .write()
            .expect("memo lock poisoned")
            .entry(fqn.to_string())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone()
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    fn compute_type(&self, fqn: &str) -> Option<Arc<TypeDecl>> {
        for (outer_fqn, inner_path) in names::nested_splits(fqn) {
            if let Some(outer) = self.load_outer(&outer_fqn) {
                if inner_path.is_empty() {
                    return Some(Arc::new(outer));
                }
                if let Some(nested) = outer.descend(&inner_path) {
                    return Some(Arc::new(nested.clone()));
                }
                // the outer unit exists but does not declare the inner chain
                return None;
            }
        }
        None
    }

    /// Loads the declaration of an outermost type, first from overrides,
    /// then from the classpath in order.
    fn load_outer(&self, fqn: &str) -> Option<TypeDecl> {
        if let Some(decl) = self.load_from_override(fqn) {
            return Some(decl);
        }
        for entry in &self.entries {
            let loaded = match (entry.mode, entry.is_directory()) {
                (ClasspathMode::Source, true) => self.load_source_dir(entry, fqn),
                (ClasspathMode::Source, false) => self.load_source_archive(entry, fqn),
                (ClasspathMode::Binary, true) => self.load_binary_dir(entry, fqn),
                (ClasspathMode::Binary, false) => self.load_binary_archive(entry, fqn),
            };
            if let Some(decl) = loaded {
                return Some(decl);
            }
        }
        None
    }

    fn load_from_override(&self, fqn: &str) -> Option<TypeDecl> {
        let (package, simple) = names::split(fqn);
        let key = (
            package.unwrap_or("").to_string(),
            format!("{simple}.java"),
        );
        let source = {
            let overrides = self.overrides.read().expect("override lock poisoned");
            overrides.get(&key).cloned()
        }?;
        self.parse_unit_source(&source, &format!("{}/{}", key.0, key.1), simple)
    }

    fn load_source_dir(&self, entry: &ClasspathEntry, fqn: &str) -> Option<TypeDecl> {
        let (_, simple) = names::split(fqn);
        let path = entry.path.join(names::fqn_to_source_path(fqn));
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable source file");
                return None;
            }
        };
        self.parse_unit_source(&source, &path.display().to_string(), simple)
    }

    fn load_source_archive(&self, entry: &ClasspathEntry, fqn: &str) -> Option<TypeDecl> {
        let (_, simple) = names::split(fqn);
        let archive = self.open_archive(&entry.path)?;
        let rel = names::fqn_to_source_path(fqn);
        match archive.read_string(&rel) {
            Ok(Some(source)) => self.parse_unit_source(&source, &rel, simple),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(archive = %entry.path.display(), error = %e, "skipping damaged archive entry");
                None
            }
        }
    }

    fn load_binary_dir(&self, entry: &ClasspathEntry, fqn: &str) -> Option<TypeDecl> {
        let root = entry.path.clone();
        self.load_binary(fqn, &|rel| {
            let path = root.join(rel);
            match fs::read(&path) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn load_binary_archive(&self, entry: &ClasspathEntry, fqn: &str) -> Option<TypeDecl> {
        let archive = self.open_archive(&entry.path)?;
        self.load_binary(fqn, &|rel| archive.read(rel))
    }

    /// Loads a class file and, recursively, its direct nested classes through
    /// `read`, which maps a `/`-separated relative path to bytes.
    fn load_binary(
        &self,
        binary_fqn: &str,
        read: &dyn Fn(&str) -> ForgeResult<Option<Vec<u8>>>,
    ) -> Option<TypeDecl> {
        let rel = names::fqn_to_class_path(binary_fqn);
        let bytes = match read(&rel) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(unit = rel, error = %e, "skipping unreadable class file");
                return None;
            }
        };
        let parsed = match classfile::parse_class(&bytes, &rel) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(unit = rel, error = %e, "skipping malformed class file");
                return None;
            }
        };
        let mut decl = parsed.decl;
        for nested_name in parsed.nested {
            if let Some(nested) = self.load_binary(&nested_name, read) {
                decl.inner_types.push(nested);
            }
        }
        Some(decl)
    }

    fn parse_unit_source(&self, source: &str, unit: &str, simple: &str) -> Option<TypeDecl> {
        let parsed = match parse::parse_compilation_unit(source, unit, self.parse_method_bodies) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(unit, error = %e, "skipping unparsable compilation unit");
                return None;
            }
        };
        parsed
            .types
            .into_iter()
            .find(|t| t.simple_name == simple)
    }

    /// Opens (or reuses) the archive at `path`. A failed open is remembered
    /// and logged once.
    fn open_archive(&self, path: &Path) -> Option<Arc<Archive>> {
        if let Some(known) = self.archives.read().expect("archive lock poisoned").get(path) {
            return known.clone();
        }
        let opened = match Archive::open(path) {
            Ok(archive) => Some(Arc::new(archive)),
            Err(e) => {
                tracing::debug!(archive = %path.display(), error = %e, "skipping unopenable archive");
                None
            }
        };
        self.archives
            .write()
            .expect("archive lock poisoned")
            .entry(path.to_path_buf())
            .or_insert(opened)
            .clone()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("entries", &self.entries)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(root: &Path, rel: &str, source: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn source_env(dir: &TempDir) -> Environment {
        EnvironmentBuilder::new()
            .with_running_classpath(false)
            .with_absolute_source_path(dir.path())
            .build()
            .unwrap()
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_unreadable_paths_dropped() {
            let dir = TempDir::new().unwrap();
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path())
                .with_absolute_source_path(dir.path().join("does-not-exist"))
                .build()
                .unwrap();
            assert_eq!(env.entries().len(), 1);
        }

        #[test]
        fn test_exclude_and_include_by_pattern_text() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("kept")).unwrap();
            fs::create_dir(dir.path().join("dropped")).unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path().join("kept"))
                .with_absolute_source_path(dir.path().join("dropped"))
                .exclude(".*dropped.*")
                .exclude(".*kept.*")
                .include(".*kept.*")
                .build()
                .unwrap();

            let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
            assert_eq!(paths, vec![dir.path().join("kept")]);
        }

        #[test]
        fn test_exclude_is_case_insensitive_whole_match() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("Target")).unwrap();
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path().join("Target"))
                .exclude(".*/target")
                .build()
                .unwrap();
            assert!(env.entries().is_empty());
        }

        #[test]
        fn test_exclude_if_contains_escapes_fragment() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("a+b")).unwrap();
            fs::create_dir(dir.path().join("ab")).unwrap();
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path().join("a+b"))
                .with_absolute_source_path(dir.path().join("ab"))
                .exclude_if_contains("a+b")
                .build()
                .unwrap();
            let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
            assert_eq!(paths, vec![dir.path().join("ab")]);
        }

        #[test]
        fn test_invalid_exclude_pattern_fails_build() {
            let err = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .exclude("[unclosed")
                .build()
                .unwrap_err();
            assert!(matches!(err, ForgeError::Config { .. }));
        }

        #[test]
        fn test_source_attachment_for_target_classes() {
            let dir = TempDir::new().unwrap();
            let module = dir.path().join("module");
            fs::create_dir_all(module.join("target/classes")).unwrap();
            fs::create_dir_all(module.join("src/main/java")).unwrap();
            fs::create_dir_all(module.join("src/test/java")).unwrap();
            fs::create_dir_all(module.join("target/test-classes")).unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_binary_path(module.join("target/classes"))
                .with_absolute_binary_path(module.join("target/test-classes"))
                .build()
                .unwrap();

            let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
            // source dirs sort before binary dirs
            assert_eq!(
                paths,
                vec![
                    module.join("src/main/java"),
                    module.join("src/test/java"),
                    module.join("target/classes"),
                    module.join("target/test-classes"),
                ]
            );
        }

        #[test]
        fn test_sources_archive_attachment() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("lib.jar"), b"").unwrap();
            fs::write(dir.path().join("lib-sources.jar"), b"").unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_binary_path(dir.path().join("lib.jar"))
                .build()
                .unwrap();

            let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
            assert_eq!(
                paths,
                vec![dir.path().join("lib-sources.jar"), dir.path().join("lib.jar")]
            );
        }

        #[test]
        fn test_without_sources_suppresses_attachment() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("lib.jar"), b"").unwrap();
            fs::write(dir.path().join("lib-sources.jar"), b"").unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_binary_path(dir.path().join("lib.jar"))
                .without_sources(".*-sources\\.jar")
                .build()
                .unwrap();

            let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
            assert_eq!(paths, vec![dir.path().join("lib.jar")]);
        }

        #[test]
        fn test_duplicate_paths_first_wins() {
            let dir = TempDir::new().unwrap();
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path())
                .with_absolute_source_path(dir.path())
                .build()
                .unwrap();
            assert_eq!(env.entries().len(), 1);
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_find_type_from_source_dir() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/Widget.java",
                "package org.demo; public class Widget { public int size; }",
            );
            let env = source_env(&dir);
            let decl = env.find_type("org.demo.Widget").unwrap().unwrap();
            assert_eq!(decl.simple_name, "Widget");
            assert!(decl.field("size").is_some());
        }

        #[test]
        fn test_miss_is_none_and_require_is_error() {
            let dir = TempDir::new().unwrap();
            let env = source_env(&dir);
            assert!(env.find_type("org.demo.Missing").unwrap().is_none());
            let err = env.require_type("org.demo.Missing").unwrap_err();
            assert!(matches!(err, ForgeError::TypeNotFound { .. }));
        }

        #[test]
        fn test_nested_type_both_query_forms() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/Outer.java",
                "package org.demo; public class Outer { public static class Inner {} }",
            );
            let env = source_env(&dir);
            let dotted = env.find_type("org.demo.Outer.Inner").unwrap().unwrap();
            let binary = env.find_type("org.demo.Outer$Inner").unwrap().unwrap();
            assert_eq!(dotted.fqn, "org.demo.Outer.Inner");
            assert_eq!(dotted.fqn, binary.fqn);
        }

        #[test]
        fn test_lookup_is_memoized_until_reload() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/A.java",
                "package org.demo; public class A {}",
            );
            let env = source_env(&dir);
            let first = env.find_type("org.demo.A").unwrap().unwrap();

            // change the file on disk; the memoized value must survive
            write_source(
                dir.path(),
                "org/demo/A.java",
                "package org.demo; public class A { public int added; }",
            );
            let cached = env.find_type("org.demo.A").unwrap().unwrap();
            assert!(Arc::ptr_eq(&first, &cached));
            assert!(cached.field("added").is_none());

            env.reload().unwrap();
            let fresh = env.find_type("org.demo.A").unwrap().unwrap();
            assert!(fresh.field("added").is_some());
        }

        #[test]
        fn test_override_shadows_classpath() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/B.java",
                "package org.demo; public class B {}",
            );
            let env = source_env(&dir);

            let changed = env
                .register_override(
                    "org.demo",
                    "B.java",
                    "package org.demo; public class B { public void added() {} }",
                )
                .unwrap();
            assert!(changed);

            // identical re-registration needs no reload
            let changed_again = env
                .register_override(
                    "org.demo",
                    "B.java",
                    "package org.demo; public class B { public void added() {} }",
                )
                .unwrap();
            assert!(!changed_again);

            env.reload().unwrap();
            let decl = env.find_type("org.demo.B").unwrap().unwrap();
            assert!(decl.methods_named("added").next().is_some());
        }

        #[test]
        fn test_entry_order_shadows_later_entries() {
            let dir_a = TempDir::new().unwrap();
            let dir_b = TempDir::new().unwrap();
            write_source(
                dir_a.path(),
                "org/demo/C.java",
                "package org.demo; public class C { public int first; }",
            );
            write_source(
                dir_b.path(),
                "org/demo/C.java",
                "package org.demo; public class C { public int second; }",
            );

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir_a.path())
                .with_absolute_source_path(dir_b.path())
                .build()
                .unwrap();

            let decl = env.find_type("org.demo.C").unwrap().unwrap();
            assert!(decl.field("first").is_some());
        }

        #[test]
        fn test_closed_environment_rejects_queries() {
            let dir = TempDir::new().unwrap();
            let env = source_env(&dir);
            env.close();
            env.close(); // idempotent
            assert!(matches!(
                env.find_type("a.B").unwrap_err(),
                ForgeError::EnvironmentClosed
            ));
            assert!(matches!(env.reload().unwrap_err(), ForgeError::EnvironmentClosed));
        }

        #[test]
        fn test_run_closes_after_use() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/D.java",
                "package org.demo; public class D {}",
            );
            let simple = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path())
                .run(|env| Ok(env.require_type("org.demo.D")?.simple_name.clone()))
                .unwrap();
            assert_eq!(simple, "D");
        }

        #[test]
        fn test_method_bodies_retained_on_request() {
            let dir = TempDir::new().unwrap();
            write_source(
                dir.path(),
                "org/demo/E.java",
                "package org.demo; public class E { int f() { return 1; } }",
            );
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path())
                .with_parse_method_bodies(true)
                .build()
                .unwrap();
            let decl = env.find_type("org.demo.E").unwrap().unwrap();
            let f = decl.methods_named("f").next().unwrap();
            assert_eq!(f.body.as_deref(), Some("return 1;"));
        }
    }

    mod archive_lookup_tests {
        use super::*;
        use std::fs::File;
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        #[test]
        fn test_find_type_in_sources_jar() {
            let dir = TempDir::new().unwrap();
            let jar = dir.path().join("demo-sources.jar");
            let file = File::create(&jar).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            writer
                .start_file("org/demo/FromJar.java", SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(b"package org.demo; public interface FromJar {}")
                .unwrap();
            writer.finish().unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(&jar)
                .build()
                .unwrap();
            let decl = env.find_type("org.demo.FromJar").unwrap().unwrap();
            assert_eq!(decl.kind, crate::model::TypeKind::Interface);
        }

        #[test]
        fn test_damaged_archive_is_skipped() {
            let dir = TempDir::new().unwrap();
            let bad = dir.path().join("bad.jar");
            fs::write(&bad, b"not a zip").unwrap();
            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_binary_path(&bad)
                .build()
                .unwrap();
            // damage surfaces as a miss, not an error
            assert!(env.find_type("org.demo.X").unwrap().is_none());
        }
    }

    mod package_listing_tests {
        use super::*;
        use std::fs::File;
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        #[test]
        fn test_types_in_package_across_entries() {
            let dir = TempDir::new().unwrap();
            write_source(dir.path(), "org/demo/A.java", "package org.demo; class A {}");
            write_source(dir.path(), "org/demo/B.java", "package org.demo; class B {}");
            write_source(dir.path(), "org/demo/deep/C.java", "package org.demo.deep; class C {}");
            write_source(dir.path(), "org/demo/package-info.java", "package org.demo;");

            let jar = dir.path().join("extra-sources.jar");
            let file = File::create(&jar).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            writer
                .start_file("org/demo/FromJar.java", SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(b"package org.demo; interface FromJar {}")
                .unwrap();
            writer.finish().unwrap();

            let env = EnvironmentBuilder::new()
                .with_running_classpath(false)
                .with_absolute_source_path(dir.path())
                .with_absolute_source_path(&jar)
                .build()
                .unwrap();
            env.register_override("org.demo", "FromOverride.java", "package org.demo; class FromOverride {}")
                .unwrap();

            assert_eq!(
                env.types_in_package("org.demo").unwrap(),
                vec![
                    "org.demo.A",
                    "org.demo.B",
                    "org.demo.FromJar",
                    "org.demo.FromOverride",
                ]
            );
            assert_eq!(env.types_in_package("org.demo.deep").unwrap(), vec!["org.demo.deep.C"]);
            assert!(env.types_in_package("org.empty").unwrap().is_empty());
        }
    }
}
