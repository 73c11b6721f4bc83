//! The object store: object slots, column set, insertion and queries

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;

use crate::column::{Column, FilterValue, ObjectId};
use crate::config::SlicerConfig;
use crate::errors::{SlicerError, SlicerResult};
use crate::observability::{Event, Logger, Severity};
use crate::schema::Schema;
use crate::slice::{collect_properties, ObjectMeta, ObjectRecord, Slice, SliceIter};

/// Store-wide predicate every inserted object must satisfy
pub type Validator<T> = dyn Fn(&T) -> bool + Send + Sync;

pub(crate) type ColumnMap<T> = BTreeMap<String, Arc<Column<T>>>;

/// In-memory object store with typed tag columns.
///
/// Column registration and id allocation take separate locks. An insertion
/// racing a column registration may or may not see the new column. Reads
/// take no lock across a whole query and are best-effort under concurrent
/// writes.
pub struct Slicer<T> {
    validator: Option<Arc<Validator<T>>>,
    config: SlicerConfig,
    columns: RwLock<ColumnMap<T>>,
    /// Slot per reserved id; `None` is a tombstone
    objects: RwLock<Vec<Option<Arc<T>>>>,
}

impl<T> Slicer<T> {
    /// Creates an empty store accepting any object
    pub fn new() -> Self {
        Self::with_config(SlicerConfig::default())
    }

    /// Creates an empty store with the given configuration
    pub fn with_config(config: SlicerConfig) -> Self {
        Self {
            validator: None,
            config,
            columns: RwLock::new(BTreeMap::new()),
            objects: RwLock::new(Vec::new()),
        }
    }

    /// Installs the store-wide object validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Returns the configuration
    pub fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Registers a column under `name`
    pub fn add_col(&self, name: &str, mut col: Column<T>) -> SlicerResult<()> {
        col.set_name(name)?;
        let mut columns = self.columns_mut();
        if columns.contains_key(name) {
            return Err(SlicerError::column_exists(name));
        }
        columns.insert(name.to_string(), Arc::new(col));
        drop(columns);

        Logger::info(Event::ColumnAdded.as_str(), &[("column", name)]);
        Ok(())
    }

    /// Registers `col` unless a column of that name exists.
    ///
    /// An existing column with the same domain is kept and `false` returned;
    /// a different domain is a conflict.
    pub(crate) fn merge_col(&self, name: &str, mut col: Column<T>) -> SlicerResult<bool> {
        col.set_name(name)?;
        let mut columns = self.columns_mut();
        if let Some(existing) = columns.get(name) {
            if existing.domain() != col.domain() {
                return Err(SlicerError::domain_mismatch(name));
            }
            return Ok(false);
        }
        columns.insert(name.to_string(), Arc::new(col));
        drop(columns);

        Logger::info(Event::ColumnAdded.as_str(), &[("column", name)]);
        Ok(true)
    }

    /// Inserts `obj` and returns its id.
    ///
    /// Each registered column takes the supplied value for its name or
    /// applies its default. If any column fails after the id is reserved,
    /// the slot becomes a tombstone and the id is never reused; attributes
    /// already written for that id by other columns stay in place.
    pub fn add<I, K, V>(&self, obj: T, properties: I) -> SlicerResult<ObjectId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if let Some(validator) = &self.validator {
            if !(**validator)(&obj) {
                let err = SlicerError::object_rejected();
                Logger::warn(
                    Event::ObjectRejected.as_str(),
                    &[("code", err.code().code()), ("reason", err.message())],
                );
                return Err(err);
            }
        }

        let mut properties: BTreeMap<String, Value> = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let columns = self.columns_snapshot();
        if let Some(unknown) = properties.keys().find(|k| !columns.contains_key(*k)) {
            return Err(SlicerError::unknown_column(unknown.as_str()));
        }

        let obj = Arc::new(obj);
        let obj_id = {
            let mut objects = self.objects_mut();
            objects.push(Some(Arc::clone(&obj)));
            objects.len() - 1
        };

        for (name, col) in &columns {
            let attribute = properties.remove(name);
            let result = match &attribute {
                Some(value) if self.config.validate_attributes => col.validate_attribute(value),
                _ => Ok(()),
            }
            .and_then(|()| col.add(&obj, obj_id, attribute));

            if let Err(err) = result {
                self.tombstone(obj_id);
                let id_str = obj_id.to_string();
                Logger::warn(
                    Event::ObjectRejected.as_str(),
                    &[
                        ("code", err.code().code()),
                        ("column", name.as_str()),
                        ("object_id", id_str.as_str()),
                        ("reason", err.message()),
                    ],
                );
                return Err(err);
            }
        }

        if Logger::enabled(Severity::Trace) {
            let id_str = obj_id.to_string();
            Logger::trace(Event::ObjectAdded.as_str(), &[("object_id", id_str.as_str())]);
        }
        Ok(obj_id)
    }

    /// Inserts `obj` with every column taking its default
    pub fn insert(&self, obj: T) -> SlicerResult<ObjectId> {
        self.add(obj, std::iter::empty::<(String, Value)>())
    }

    /// Starts a filter chain over this store
    pub fn get<I, K, V>(&self, properties: I) -> Slice<'_, T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterValue>,
    {
        Slice::root(self, collect_properties(properties))
    }

    /// Unfiltered slice over the whole store
    pub fn slice(&self) -> Slice<'_, T> {
        Slice::root(self, Vec::new())
    }

    /// Returns every live `(id, object)` pair in id order
    pub fn all(&self) -> Vec<(ObjectId, Arc<T>)> {
        self.objects()
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|obj| (id, Arc::clone(obj))))
            .collect()
    }

    /// Returns the live object at `id`
    pub fn object(&self, id: ObjectId) -> Option<Arc<T>> {
        self.objects().get(id).cloned().flatten()
    }

    /// Returns whether `id` was reserved and then tombstoned
    pub fn is_tombstone(&self, id: ObjectId) -> bool {
        matches!(self.objects().get(id), Some(None))
    }

    /// Returns the tombstoned ids in order
    pub fn tombstones(&self) -> Vec<ObjectId> {
        self.objects()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the column registered under `name`
    pub fn get_column(&self, name: &str) -> Option<Arc<Column<T>>> {
        self.columns().get(name).cloned()
    }

    /// Returns the registered column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns().keys().cloned().collect()
    }

    /// Exports the current column definitions
    pub fn schema(&self) -> Schema<T> {
        Schema::export(self)
    }

    /// Returns every column's attribute for `id`; `null` where none is recorded
    pub fn get_obj_meta(&self, id: ObjectId) -> ObjectMeta {
        self.columns()
            .iter()
            .map(|(name, col)| (name.clone(), col.attribute(id).unwrap_or(Value::Null)))
            .collect()
    }

    /// Returns the record of the live object at `id`
    pub fn record(&self, id: ObjectId, serialize_obj: bool) -> Option<ObjectRecord<T>> {
        let obj = self.object(id)?;
        let obj = if serialize_obj { Some(obj) } else { None };
        Some(ObjectRecord::new(id, self.get_obj_meta(id), obj))
    }

    /// Returns a record for every live object
    pub fn serialize(&self, serialize_obj: bool) -> Vec<ObjectRecord<T>> {
        self.all()
            .into_iter()
            .map(|(id, obj)| {
                let obj = if serialize_obj { Some(obj) } else { None };
                ObjectRecord::new(id, self.get_obj_meta(id), obj)
            })
            .collect()
    }

    /// Pretty JSON of every live object's record
    pub fn inspect(&self, serialize_obj: bool) -> SlicerResult<String>
    where
        T: Serialize,
    {
        serde_json::to_string_pretty(&self.serialize(serialize_obj)).map_err(|e| {
            SlicerError::encoding(format!("Failed to render store contents: {}", e))
        })
    }

    /// Returns the next id to assign (reserved slots, live or tombstoned)
    pub fn next_id(&self) -> ObjectId {
        self.objects().len()
    }

    /// Returns the number of reserved ids
    pub fn len(&self) -> usize {
        self.next_id()
    }

    /// Returns whether no id has been reserved
    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Returns the number of live objects
    pub fn live_count(&self) -> usize {
        self.objects().iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn columns_snapshot(&self) -> ColumnMap<T> {
        self.columns().clone()
    }

    pub(crate) fn replace_objects(&self, slots: Vec<Option<Arc<T>>>) {
        *self.objects_mut() = slots;
    }

    pub(crate) fn object_slots(&self) -> Vec<Option<Arc<T>>> {
        self.objects().clone()
    }

    fn tombstone(&self, id: ObjectId) {
        if let Some(slot) = self.objects_mut().get_mut(id) {
            *slot = None;
        }
    }

    fn columns(&self) -> RwLockReadGuard<'_, ColumnMap<T>> {
        self.columns.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn columns_mut(&self) -> RwLockWriteGuard<'_, ColumnMap<T>> {
        self.columns.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn objects(&self) -> RwLockReadGuard<'_, Vec<Option<Arc<T>>>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn objects_mut(&self) -> RwLockWriteGuard<'_, Vec<Option<Arc<T>>>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Every live object with its metadata, in id order
impl<'s, T> IntoIterator for &'s Slicer<T> {
    type Item = (ObjectMeta, Arc<T>);
    type IntoIter = SliceIter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        SliceIter::new(self, self.all())
    }
}

impl<T> Default for Slicer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Slicer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slicer")
            .field("columns", &self.column_names())
            .field("next_id", &self.next_id())
            .field("live", &self.live_count())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
