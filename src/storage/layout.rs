//! On-disk layout of a saved store and the file helpers every writer uses
//!
//! ```text
//! <root>/
//! ├── manifest.json
//! ├── schema/<column>/domain
//! ├── meta/<column>/metadata
//! └── objects/<id>/{object.json | tombstone | codec-defined files}
//! ```
//!
//! All JSON files are written to a temp file and renamed into place.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::column::ObjectId;
use crate::errors::{SlicerError, SlicerResult};

/// Subdirectory holding column domains
pub const SCHEMA_DIR: &str = "schema";
/// Subdirectory holding column attribute maps
pub const META_DIR: &str = "meta";
/// Subdirectory holding object payloads
pub const OBJECTS_DIR: &str = "objects";
/// Manifest file name
pub const MANIFEST_FILE: &str = "manifest.json";
/// Domain file inside a column directory
pub const DOMAIN_FILE: &str = "domain";
/// Attribute map file inside a column directory
pub const METADATA_FILE: &str = "metadata";
/// Placeholder file marking a tombstoned object id
pub const TOMBSTONE_FILE: &str = "tombstone";

/// Paths of one saved store
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Creates a layout rooted at `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/manifest.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Returns `<root>/schema`
    pub fn schema_dir(&self) -> PathBuf {
        self.root.join(SCHEMA_DIR)
    }

    /// Returns `<root>/meta`
    pub fn meta_root(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    /// Returns `<root>/meta/<column>`
    pub fn meta_dir(&self, column: &str) -> PathBuf {
        self.meta_root().join(column)
    }

    /// Returns `<root>/meta/<column>/metadata`
    pub fn metadata_path(&self, column: &str) -> PathBuf {
        self.meta_dir(column).join(METADATA_FILE)
    }

    /// Returns `<root>/objects`
    pub fn objects_root(&self) -> PathBuf {
        self.root.join(OBJECTS_DIR)
    }

    /// Returns `<root>/objects/<id>`
    pub fn object_dir(&self, id: ObjectId) -> PathBuf {
        self.objects_root().join(id.to_string())
    }

    /// Removes every file a previous save wrote under the root.
    ///
    /// The manifest goes first, so an interrupted save never leaves a
    /// manifest describing a mixed tree.
    pub fn clear(&self) -> SlicerResult<()> {
        remove_file_if_exists(&self.manifest_path())?;
        remove_dir_if_exists(&self.schema_dir())?;
        remove_dir_if_exists(&self.meta_root())?;
        remove_dir_if_exists(&self.objects_root())
    }

    /// Returns `<root>/objects/<id>/tombstone`
    pub fn tombstone_path(&self, id: ObjectId) -> PathBuf {
        self.object_dir(id).join(TOMBSTONE_FILE)
    }
}

/// Checks that `name` can be used as one path component.
///
/// Returns the reason on failure.
pub fn check_entry_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name == "." || name == ".." {
        return Err("must not be '.' or '..'");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("must not contain a path separator");
    }
    Ok(())
}

/// Creates `path` and its parents if missing
pub fn ensure_dir(path: &Path) -> SlicerResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| SlicerError::io_error_at_path(path, e))?;
    }
    Ok(())
}

/// Writes bytes to `path` via a temp file in the same directory, then renames
pub fn write_atomic(path: &Path, bytes: &[u8]) -> SlicerResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| SlicerError::malformed(path, "path has no parent directory"))?;
    ensure_dir(parent)?;

    let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
    let mut file = File::create(&tmp_path).map_err(|e| SlicerError::io_error_at_path(&tmp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| SlicerError::io_error_at_path(&tmp_path, e))?;
    file.sync_all()
        .map_err(|e| SlicerError::io_error_at_path(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| SlicerError::io_error_at_path(path, e))?;

    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically
pub fn write_json<V: Serialize + ?Sized>(path: &Path, value: &V) -> SlicerResult<()> {
    let content = serde_json::to_vec_pretty(value)
        .map_err(|e| {
            SlicerError::encoding(format!("Failed to serialize '{}': {}", path.display(), e))
        })?;
    write_atomic(path, &content)
}

/// Reads and deserializes a JSON file
///
/// A missing file is `SLICER_NOT_FOUND`; undecodable content is `SLICER_CORRUPTION`.
pub fn read_json<V: DeserializeOwned>(path: &Path) -> SlicerResult<V> {
    let content = fs::read(path).map_err(|e| SlicerError::io_error_at_path(path, e))?;
    serde_json::from_slice(&content)
        .map_err(|e| SlicerError::malformed(path, format!("Invalid JSON: {}", e)))
}

/// Removes `path` and everything below it, if present
pub fn remove_dir_if_exists(path: &Path) -> SlicerResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SlicerError::io_error_at_path(path, e)),
    }
}

/// Removes the file at `path`, if present
pub fn remove_file_if_exists(path: &Path) -> SlicerResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SlicerError::io_error_at_path(path, e)),
    }
}

/// Lists the names of the immediate subdirectories of `dir`, sorted
pub fn list_subdirs(dir: &Path) -> SlicerResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| SlicerError::io_error_at_path(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SlicerError::io_error_at_path(dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
