//! Column definitions shared between stores

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use crate::column::Column;
use crate::errors::{SlicerError, SlicerResult};
use crate::observability::{Event, Logger};
use crate::slicer::Slicer;

/// Definition-only snapshot of a store's columns.
///
/// Subscribed stores receive every column the schema holds or later gains.
/// Propagation is one-way: columns a subscriber adds on its own never reach
/// the schema or sibling subscribers. Subscribers are held weakly, so a
/// dropped store simply stops receiving columns.
pub struct Schema<T> {
    columns: RwLock<BTreeMap<String, Column<T>>>,
    subscriptions: Mutex<Vec<Weak<Slicer<T>>>>,
}

impl<T> Schema<T> {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::from_columns(BTreeMap::new())
    }

    pub(crate) fn from_columns(columns: BTreeMap<String, Column<T>>) -> Self {
        Self {
            columns: RwLock::new(columns),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Copies every column definition of `slicer`, without attributes
    pub fn export(slicer: &Slicer<T>) -> Self {
        Self::from_columns(
            slicer
                .columns_snapshot()
                .into_iter()
                .map(|(name, col)| (name, col.definition()))
                .collect(),
        )
    }

    /// Subscribes each store and gives it a copy of every schema column.
    ///
    /// A store already holding a same-named column with the same domain keeps
    /// it; a different domain is a conflict and stops the subscription there.
    pub fn subscribe(&self, stores: &[&Arc<Slicer<T>>]) -> SlicerResult<()> {
        for store in stores {
            self.subscriptions().push(Arc::downgrade(store));

            for (name, col) in self.columns().iter() {
                store.merge_col(name, col.definition())?;
            }

            let count = self.columns().len().to_string();
            Logger::info(
                Event::SchemaSubscribed.as_str(),
                &[("columns", count.as_str())],
            );
        }
        Ok(())
    }

    /// Adds a column and pushes a copy to every live subscriber.
    ///
    /// Every subscriber is visited; the first failure is returned.
    pub fn add_col(&self, name: &str, mut col: Column<T>) -> SlicerResult<()> {
        col.set_name(name)?;
        {
            let mut columns = self.columns_mut();
            if columns.contains_key(name) {
                return Err(SlicerError::column_exists(name));
            }
            columns.insert(name.to_string(), col.definition());
        }
        Logger::info(Event::SchemaColumnAdded.as_str(), &[("column", name)]);

        let subscribers: Vec<Arc<Slicer<T>>> = {
            let mut subscriptions = self.subscriptions();
            subscriptions.retain(|weak| weak.strong_count() > 0);
            subscriptions.iter().filter_map(Weak::upgrade).collect()
        };

        let mut first_err = None;
        for store in subscribers {
            if let Err(err) = store.merge_col(name, col.definition()) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns a definition copy of the column named `name`
    pub fn get_column(&self, name: &str) -> Option<Column<T>> {
        self.columns().get(name).map(Column::definition)
    }

    /// Returns definition copies of every column, by name
    pub fn columns_by_name(&self) -> BTreeMap<String, Column<T>> {
        self.columns()
            .iter()
            .map(|(name, col)| (name.clone(), col.definition()))
            .collect()
    }

    /// Returns the column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns().keys().cloned().collect()
    }

    /// Returns whether a column named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.columns().contains_key(name)
    }

    /// Returns the number of columns
    pub fn len(&self) -> usize {
        self.columns().len()
    }

    /// Returns whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Returns the number of subscribed stores still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub(crate) fn columns(&self) -> RwLockReadGuard<'_, BTreeMap<String, Column<T>>> {
        self.columns.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn columns_mut(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Column<T>>> {
        self.columns.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscriptions(&self) -> MutexGuard<'_, Vec<Weak<Slicer<T>>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("columns", &*self.columns())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
