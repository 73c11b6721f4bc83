//! Object payload codecs
//!
//! Every live object is written into its own `objects/<id>/` directory. How
//! the bytes look is up to the codec:
//!
//! - [`JsonCodec`]: generic fallback, one JSON file per object
//! - [`SelfCodec`]: delegates to objects implementing [`Persist`]

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::layout;
use crate::errors::SlicerResult;

/// Default file name used by [`JsonCodec`]
pub const DEFAULT_OBJECT_FILE: &str = "object.json";

/// Writes and reads one object inside its per-id directory
pub trait ObjectCodec<T> {
    /// Writes `obj` into `dir` (which may not exist yet)
    fn write(&self, obj: &T, dir: &Path) -> SlicerResult<()>;

    /// Reads an object back from `dir`
    fn read(&self, dir: &Path) -> SlicerResult<T>;
}

/// Objects that know how to save and load themselves
pub trait Persist: Sized {
    /// Saves this object into `dir`
    fn save(&self, dir: &Path) -> SlicerResult<()>;

    /// Loads an object from `dir`
    fn load(dir: &Path) -> SlicerResult<Self>;
}

/// Serializes each object to a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCodec {
    file_name: String,
}

impl JsonCodec {
    /// Codec writing `object.json`
    pub fn new() -> Self {
        Self::with_file_name(DEFAULT_OBJECT_FILE)
    }

    /// Codec writing a custom file name
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Returns the payload file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> ObjectCodec<T> for JsonCodec {
    fn write(&self, obj: &T, dir: &Path) -> SlicerResult<()> {
        layout::write_json(&dir.join(&self.file_name), obj)
    }

    fn read(&self, dir: &Path) -> SlicerResult<T> {
        layout::read_json(&dir.join(&self.file_name))
    }
}

/// Delegates to the object's own [`Persist`] implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfCodec;

impl<T: Persist> ObjectCodec<T> for SelfCodec {
    fn write(&self, obj: &T, dir: &Path) -> SlicerResult<()> {
        layout::ensure_dir(dir)?;
        obj.save(dir)
    }

    fn read(&self, dir: &Path) -> SlicerResult<T> {
        T::load(dir)
    }
}
