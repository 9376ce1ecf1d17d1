//! Archive access for `.jar`, `.zip` and `.jmod` classpath entries.
//!
//! Archives are opened lazily and kept open for the lifetime of their
//! environment. Lookups are by relative entry path; a missing entry is
//! `Ok(None)`, only a damaged archive is an error. `.jmod` files nest their
//! class files under a `classes/` prefix, which is applied transparently.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::classpath::extension_of;
use crate::error::{ForgeError, ForgeResult};

/// Entry prefix inside `.jmod` archives.
const JMOD_CLASSES_PREFIX: &str = "classes/";

/// An open classpath archive.
///
/// The underlying zip reader needs `&mut` for entry access, so it sits behind
/// a mutex; reads are short and whole-entry.
pub struct Archive {
    path: PathBuf,
    prefix: &'static str,
    zip: Mutex<ZipArchive<File>>,
}

impl Archive {
    /// Opens an archive file. The entry prefix is derived from the extension.
    pub fn open(path: &Path) -> ForgeResult<Archive> {
        let file = File::open(path).map_err(|e| archive_error(path, e.to_string()))?;
        let zip = ZipArchive::new(file).map_err(|e| archive_error(path, e.to_string()))?;
        let prefix = match extension_of(path).as_deref() {
            Some("jmod") => JMOD_CLASSES_PREFIX,
            _ => "",
        };
        Ok(Archive {
            path: path.to_path_buf(),
            prefix,
            zip: Mutex::new(zip),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads an entry to bytes. `rel` is `/`-separated and does not include
    /// the jmod `classes/` prefix.
    pub fn read(&self, rel: &str) -> ForgeResult<Option<Vec<u8>>> {
        let name = format!("{}{}", self.prefix, rel);
        let mut zip = self.zip.lock().expect("archive lock poisoned");
        let mut entry = match zip.by_name(&name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(archive_error(&self.path, e.to_string())),
        };
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| archive_error(&self.path, e.to_string()))?;
        Ok(Some(buf))
    }

    /// Reads an entry as UTF-8 text.
    pub fn read_string(&self, rel: &str) -> ForgeResult<Option<String>> {
        match self.read(rel)? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| archive_error(&self.path, format!("{rel} is not valid UTF-8")))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Returns true if the archive contains the entry.
    pub fn contains(&self, rel: &str) -> bool {
        let name = format!("{}{}", self.prefix, rel);
        let zip = self.zip.lock().expect("archive lock poisoned");
        zip.index_for_name(&name).is_some()
    }

    /// Entry paths directly under `rel_dir` (`/`-terminated, without the
    /// jmod prefix), excluding entries in deeper directories.
    pub fn entries_under(&self, rel_dir: &str) -> Vec<String> {
        let dir = format!("{}{}", self.prefix, rel_dir);
        let zip = self.zip.lock().expect("archive lock poisoned");
        zip.file_names()
            .filter_map(|name| {
                let tail = name.strip_prefix(&dir)?;
                if tail.is_empty() || tail.contains('/') {
                    return None;
                }
                Some(name[self.prefix.len()..].to_string())
            })
            .collect()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

fn archive_error(path: &Path, message: impl Into<String>) -> ForgeError {
    ForgeError::Archive {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
