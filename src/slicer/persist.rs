//! Saving and reopening a store directory
//!
//! Save clears the previous tree, then writes schema, metadata, objects and
//! finally the manifest. Open reads the manifest first and only accepts the
//! columns it lists.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::Slicer;
use crate::config::SlicerConfig;
use crate::errors::SlicerResult;
use crate::observability::{Event, Logger, ObservationScope};
use crate::schema::Schema;
use crate::storage::checksum;
use crate::storage::layout::{self, StoreLayout};
use crate::storage::{JsonCodec, ObjectCodec, StoreManifest};

impl<T> Slicer<T> {
    /// Saves the store with the JSON object codec
    pub fn save(&self, dir: &Path) -> SlicerResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.config().validate()?;
        let codec = JsonCodec::with_file_name(self.config().object_file.clone());
        self.save_with(dir, &codec)
    }

    /// Saves the store, writing each object with `codec`
    pub fn save_with<C: ObjectCodec<T>>(&self, dir: &Path, codec: &C) -> SlicerResult<()> {
        let dir_str = dir.display().to_string();
        let scope = ObservationScope::with_fields("STORE_SAVE", &[("dir", dir_str.as_str())]);

        match self.write_tree(&StoreLayout::new(dir), codec) {
            Ok(manifest) => {
                let objects = manifest.object_count.to_string();
                let tombstones = manifest.tombstones.len().to_string();
                Logger::info(
                    Event::StoreSaved.as_str(),
                    &[
                        ("dir", dir_str.as_str()),
                        ("objects", objects.as_str()),
                        ("tombstones", tombstones.as_str()),
                    ],
                );
                scope.complete_with_fields(&[("objects", objects.as_str())]);
                Ok(())
            }
            Err(err) => {
                scope.fail(&err);
                Err(err)
            }
        }
    }

    fn write_tree<C: ObjectCodec<T>>(
        &self,
        store: &StoreLayout,
        codec: &C,
    ) -> SlicerResult<StoreManifest> {
        layout::ensure_dir(store.root())?;
        store.clear()?;

        let columns = self.columns_snapshot();
        let schema: Schema<T> = Schema::from_columns(
            columns
                .iter()
                .map(|(name, col)| (name.clone(), col.definition()))
                .collect(),
        );
        schema.save(&store.schema_dir())?;

        let mut metadata_checksums = BTreeMap::new();
        for (name, col) in columns {
            col.save_metadata(&store.meta_dir(&name))?;
            let sum = checksum::file_checksum(&store.metadata_path(&name))?;
            metadata_checksums.insert(name, sum);
        }

        let slots = self.object_slots();
        let mut tombstones = Vec::new();
        for (id, slot) in slots.iter().enumerate() {
            match slot {
                Some(obj) => codec.write(obj, &store.object_dir(id))?,
                None => {
                    layout::write_atomic(&store.tombstone_path(id), b"")?;
                    tombstones.push(id);
                }
            }
        }

        let manifest = StoreManifest::new(slots.len(), tombstones, metadata_checksums);
        manifest.write_to_file(&store.manifest_path())?;
        Ok(manifest)
    }

    /// Opens a store saved with the JSON object codec, using the default
    /// configuration
    pub fn open(dir: &Path) -> SlicerResult<Arc<Self>>
    where
        T: Serialize + DeserializeOwned,
    {
        let config = SlicerConfig::default();
        let codec = JsonCodec::with_file_name(config.object_file.clone());
        Self::open_with(dir, &codec, config)
    }

    /// Opens a saved store, reading each object with `codec`.
    ///
    /// Column defaults and the store validator are code and do not survive a
    /// round trip: reopened columns store `null` for omitted values and the
    /// store accepts any object. A directory without `manifest.json` is read
    /// by probing `objects/0`, `objects/1`, ... until one is missing.
    pub fn open_with<C: ObjectCodec<T>>(
        dir: &Path,
        codec: &C,
        config: SlicerConfig,
    ) -> SlicerResult<Arc<Self>> {
        let dir_str = dir.display().to_string();
        let scope = ObservationScope::with_fields("STORE_OPEN", &[("dir", dir_str.as_str())]);

        match Self::read_tree(&StoreLayout::new(dir), codec, config) {
            Ok(slicer) => {
                let objects = slicer.next_id().to_string();
                Logger::info(
                    Event::StoreOpened.as_str(),
                    &[("dir", dir_str.as_str()), ("objects", objects.as_str())],
                );
                scope.complete_with_fields(&[("objects", objects.as_str())]);
                Ok(slicer)
            }
            Err(err) => {
                scope.fail(&err);
                Err(err)
            }
        }
    }

    fn read_tree<C: ObjectCodec<T>>(
        store: &StoreLayout,
        codec: &C,
        config: SlicerConfig,
    ) -> SlicerResult<Arc<Self>> {
        config.validate()?;
        let verify = config.verify_checksums;
        let slicer = Arc::new(Self::with_config(config));

        let manifest_path = store.manifest_path();
        let manifest = if manifest_path.is_file() {
            Some(StoreManifest::read_from_file(&manifest_path)?)
        } else {
            let root = store.root().display().to_string();
            Logger::warn(Event::LegacyLayout.as_str(), &[("dir", root.as_str())]);
            None
        };

        let schema: Schema<T> = Schema::open(&store.schema_dir())?;
        if let Some(manifest) = &manifest {
            manifest.check_columns(store, &schema.column_names())?;
        }
        schema.subscribe(&[&slicer])?;

        if let (Some(manifest), true) = (&manifest, verify) {
            if let Err(err) = manifest.verify_metadata(store) {
                Logger::fatal(
                    Event::ChecksumMismatch.as_str(),
                    &[("reason", err.message())],
                );
                return Err(err);
            }
        }

        for name in slicer.column_names() {
            if let Some(col) = slicer.get_column(&name) {
                col.open_metadata(&store.meta_dir(&name))?;
            }
        }

        let slots = match &manifest {
            Some(manifest) => {
                let mut slots = Vec::with_capacity(manifest.object_count);
                for id in 0..manifest.object_count {
                    if manifest.is_tombstone(id) {
                        slots.push(None);
                    } else {
                        slots.push(Some(Arc::new(codec.read(&store.object_dir(id))?)));
                    }
                }
                slots
            }
            None => Self::probe_objects(store, codec)?,
        };
        slicer.replace_objects(slots);

        Ok(slicer)
    }

    fn probe_objects<C: ObjectCodec<T>>(
        store: &StoreLayout,
        codec: &C,
    ) -> SlicerResult<Vec<Option<Arc<T>>>> {
        let mut slots = Vec::new();
        loop {
            let id = slots.len();
            let object_dir = store.object_dir(id);
            if !object_dir.is_dir() {
                return Ok(slots);
            }
            if store.tombstone_path(id).is_file() {
                slots.push(None);
            } else {
                slots.push(Some(Arc::new(codec.read(&object_dir)?)));
            }
        }
    }
}
