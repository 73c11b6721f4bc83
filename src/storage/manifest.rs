//! Store manifest structure and serialization
//!
//! `manifest.json` is the authoritative descriptor of a saved store:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "created_at": "2026-02-04T11:30:00Z",
//!   "object_count": 600,
//!   "tombstones": [17],
//!   "metadata_checksums": {
//!     "even": "crc32:abcd1234"
//!   }
//! }
//! ```
//!
//! `object_count` replaces probing `objects/<id>` until one is missing.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::checksum;
use super::layout::{self, StoreLayout};
use crate::column::ObjectId;
use crate::errors::{SlicerError, SlicerResult};

/// Current manifest format
pub const FORMAT_VERSION: u8 = 1;

/// Descriptor written last by `Slicer::save`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreManifest {
    /// Manifest format version
    pub format_version: u8,

    /// Creation timestamp in RFC3339 format
    pub created_at: String,

    /// Number of reserved object ids, live or tombstoned
    pub object_count: usize,

    /// Ids whose insertion failed
    #[serde(default)]
    pub tombstones: Vec<ObjectId>,

    /// CRC32 of each `meta/<column>/metadata` file (column -> checksum)
    #[serde(default)]
    pub metadata_checksums: BTreeMap<String, String>,
}

impl StoreManifest {
    /// Creates a manifest stamped with the current time
    pub fn new(
        object_count: usize,
        tombstones: Vec<ObjectId>,
        metadata_checksums: BTreeMap<String, String>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            object_count,
            tombstones,
            metadata_checksums,
        }
    }

    /// Returns whether `id` was saved as a tombstone
    pub fn is_tombstone(&self, id: ObjectId) -> bool {
        self.tombstones.binary_search(&id).is_ok()
    }

    /// Writes the manifest to `path`
    pub fn write_to_file(&self, path: &Path) -> SlicerResult<()> {
        layout::write_json(path, self)
    }

    /// Reads a manifest from `path`, rejecting unknown format versions
    pub fn read_from_file(path: &Path) -> SlicerResult<Self> {
        let manifest: Self = layout::read_json(path)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(SlicerError::malformed(
                path,
                format!(
                    "Unsupported manifest format version {} (expected {})",
                    manifest.format_version, FORMAT_VERSION
                ),
            ));
        }
        Ok(manifest)
    }

    /// Checks that the schema on disk holds exactly the listed columns
    pub fn check_columns(&self, store: &StoreLayout, columns: &[String]) -> SlicerResult<()> {
        let listed: Vec<&String> = self.metadata_checksums.keys().collect();
        let found: Vec<&String> = columns.iter().collect();
        if listed != found {
            return Err(SlicerError::malformed(
                &store.schema_dir(),
                format!(
                    "Schema columns {:?} do not match manifest columns {:?}",
                    found, listed
                ),
            ));
        }
        Ok(())
    }

    /// Recomputes the checksum of every listed metadata file and compares.
    ///
    /// Columns not listed are not checked.
    pub fn verify_metadata(&self, store: &StoreLayout) -> SlicerResult<()> {
        for (column, expected) in &self.metadata_checksums {
            let path = store.metadata_path(column);
            let actual = checksum::file_checksum(&path)?;
            if &actual != expected {
                return Err(SlicerError::checksum_mismatch(&path, expected, &actual));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlicerErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.json");

        let mut checksums = BTreeMap::new();
        checksums.insert("even".to_string(), "crc32:00000001".to_string());
        let manifest = StoreManifest::new(10, vec![3, 7], checksums);
        manifest.write_to_file(&path).unwrap();

        let back = StoreManifest::read_from_file(&path).unwrap();
        assert_eq!(back, manifest);
        assert!(back.is_tombstone(7));
        assert!(!back.is_tombstone(4));
    }

    #[test]
    fn test_created_at_is_rfc3339() {
        let manifest = StoreManifest::new(0, Vec::new(), BTreeMap::new());
        assert!(chrono::DateTime::parse_from_rfc3339(&manifest.created_at).is_ok());
        assert!(manifest.created_at.ends_with('Z'));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"format_version": 9, "created_at": "x", "object_count": 0}"#,
        )
        .unwrap();

        let err = StoreManifest::read_from_file(&path).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::Corruption);
    }

    #[test]
    fn test_check_columns_requires_exact_set() {
        let store = StoreLayout::new(Path::new("/data/store"));
        let mut checksums = BTreeMap::new();
        checksums.insert("keep".to_string(), "crc32:00000001".to_string());
        let manifest = StoreManifest::new(1, Vec::new(), checksums);

        assert!(manifest.check_columns(&store, &["keep".to_string()]).is_ok());

        let extra = ["keep".to_string(), "stale".to_string()];
        let err = manifest.check_columns(&store, &extra).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::Corruption);
        assert!(manifest.check_columns(&store, &[]).is_err());
    }

    #[test]
    fn test_verify_detects_tampered_metadata() {
        let tmp = TempDir::new().unwrap();
        let store = StoreLayout::new(tmp.path());
        let meta = store.metadata_path("even");
        layout::write_json(&meta, &serde_json::json!({"0": true})).unwrap();

        let mut checksums = BTreeMap::new();
        checksums.insert("even".to_string(), checksum::file_checksum(&meta).unwrap());
        let manifest = StoreManifest::new(1, Vec::new(), checksums);
        assert!(manifest.verify_metadata(&store).is_ok());

        fs::write(&meta, br#"{"0": false}"#).unwrap();
        let err = manifest.verify_metadata(&store).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::Corruption);
    }
}
