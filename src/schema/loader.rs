//! Saving and reopening schema directories
//!
//! One subdirectory per column, named after it, holding the column's
//! `domain` file. Attribute data is never written here.

use std::collections::BTreeMap;
use std::path::Path;

use super::registry::Schema;
use crate::column::Column;
use crate::errors::SlicerResult;
use crate::storage::layout;

impl<T> Schema<T> {
    /// Writes `<dir>/<column>/domain` for every column
    pub fn save(&self, dir: &Path) -> SlicerResult<()> {
        layout::ensure_dir(dir)?;
        for (name, col) in self.columns().iter() {
            col.save(&dir.join(name))?;
        }
        Ok(())
    }

    /// Reads every `<dir>/<column>/domain`.
    ///
    /// Reopened columns have a `null` default.
    pub fn open(dir: &Path) -> SlicerResult<Self> {
        let mut columns = BTreeMap::new();
        for name in layout::list_subdirs(dir)? {
            let col = Column::open(&dir.join(&name))?;
            columns.insert(name, col);
        }
        Ok(Self::from_columns(columns))
    }
}
