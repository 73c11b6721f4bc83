//! Chained filter nodes over a store

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use super::iter::{SliceIntoIter, SliceIter};
use super::record::ObjectMeta;
use super::record::ObjectRecord;
use crate::column::{Column, FilterValue, ObjectId};
use crate::errors::{SlicerError, SlicerResult};
use crate::slicer::Slicer;

/// Column-name to filter pairs applied at one level of a chain
pub type Properties = Vec<(String, FilterValue)>;

/// An immutable filter node.
///
/// Each `get` returns a new child; evaluation walks the parents up to the
/// store and keeps objects satisfying every property at every level.
/// Nothing is cached: every evaluation scans the store as it is now.
pub struct Slice<'s, T> {
    slicer: &'s Slicer<T>,
    parent: Option<Arc<Slice<'s, T>>>,
    properties: Properties,
}

impl<'s, T> Slice<'s, T> {
    pub(crate) fn root(slicer: &'s Slicer<T>, properties: Properties) -> Self {
        Self {
            slicer,
            parent: None,
            properties,
        }
    }

    /// Narrows this slice; the child's properties are ANDed with every
    /// ancestor's.
    pub fn get<I, K, V>(&self, properties: I) -> Slice<'s, T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterValue>,
    {
        Slice {
            slicer: self.slicer,
            parent: Some(Arc::new(self.clone())),
            properties: collect_properties(properties),
        }
    }

    /// Returns the store this slice reads from
    pub fn slicer(&self) -> &'s Slicer<T> {
        self.slicer
    }

    /// Returns this level's properties
    pub fn properties(&self) -> &[(String, FilterValue)] {
        &self.properties
    }

    /// Returns `(id, object)` for every live object satisfying the chain, in
    /// id order
    pub fn all(&self) -> SlicerResult<Vec<(ObjectId, Arc<T>)>> {
        let candidates = match &self.parent {
            Some(parent) => parent.all()?,
            None => self.slicer.all(),
        };
        if self.properties.is_empty() {
            return Ok(candidates);
        }

        let checks = self.resolve_columns()?;
        Ok(candidates
            .into_iter()
            .filter(|(id, _)| checks.iter().all(|(col, filter)| col.check(*id, filter)))
            .collect())
    }

    /// Returns the surviving objects
    pub fn eval(&self) -> SlicerResult<Vec<Arc<T>>> {
        Ok(self.all()?.into_iter().map(|(_, obj)| obj).collect())
    }

    /// Returns the surviving ids
    pub fn ids(&self) -> SlicerResult<Vec<ObjectId>> {
        Ok(self.all()?.into_iter().map(|(id, _)| id).collect())
    }

    /// Returns the number of surviving objects
    pub fn count(&self) -> SlicerResult<usize> {
        Ok(self.all()?.len())
    }

    /// Returns a record per surviving object. The object itself is included
    /// only when `serialize_obj` is set.
    pub fn serialize(&self, serialize_obj: bool) -> SlicerResult<Vec<ObjectRecord<T>>> {
        Ok(self
            .all()?
            .into_iter()
            .map(|(id, obj)| {
                let obj = if serialize_obj { Some(obj) } else { None };
                ObjectRecord::new(id, self.slicer.get_obj_meta(id), obj)
            })
            .collect())
    }

    /// Returns the first surviving object
    pub fn first(&self) -> SlicerResult<Arc<T>> {
        self.all()?
            .into_iter()
            .next()
            .map(|(_, obj)| obj)
            .ok_or_else(|| SlicerError::cardinality(format!("No object matches {}", self)))
    }

    /// Returns the sole surviving object, failing unless exactly one matches
    pub fn only(&self) -> SlicerResult<Arc<T>> {
        let mut matches = self.all()?;
        if matches.len() == 1 {
            if let Some((_, obj)) = matches.pop() {
                return Ok(obj);
            }
        }

        let listing: Vec<Value> = matches
            .iter()
            .map(|(id, _)| json!({"id": id, "meta": self.slicer.get_obj_meta(*id)}))
            .collect();
        Err(SlicerError::cardinality(format!(
            "Expected exactly one object for {}, found {}: {}",
            self,
            matches.len(),
            Value::Array(listing)
        )))
    }

    /// Starts a pass over `(meta, object)` pairs.
    ///
    /// The chain is evaluated when the pass starts; each call starts over and
    /// sees the store as it is at that moment.
    pub fn iter(&self) -> SlicerResult<SliceIter<'s, T>> {
        Ok(SliceIter::new(self.slicer, self.all()?))
    }

    fn resolve_columns(&self) -> SlicerResult<Vec<(Arc<Column<T>>, &FilterValue)>> {
        self.properties
            .iter()
            .map(|(name, filter)| {
                self.slicer
                    .get_column(name)
                    .map(|col| (col, filter))
                    .ok_or_else(|| SlicerError::unknown_column(name))
            })
            .collect()
    }
}

impl<'s, T> IntoIterator for &Slice<'s, T> {
    type Item = SlicerResult<(ObjectMeta, Arc<T>)>;
    type IntoIter = SliceIntoIter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        SliceIntoIter::new(self.iter())
    }
}

impl<T> Clone for Slice<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slicer: self.slicer,
            parent: self.parent.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Renders the chain root-first, e.g. `{even: true} -> {list_prop: [1, 2]}`
impl<T> fmt::Display for Slice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} -> ", parent)?;
        }
        write!(f, "{{")?;
        for (i, (name, filter)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, filter)?;
        }
        write!(f, "}}")
    }
}

impl<T> fmt::Debug for Slice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("properties", &self.properties)
            .field("parent", &self.parent)
            .finish()
    }
}

pub(crate) fn collect_properties<I, K, V>(properties: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FilterValue>,
{
    properties
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TypeTag;
    use crate::errors::SlicerErrorCode;

    fn numbers() -> Slicer<i64> {
        let store = Slicer::new();
        store.add_col("n", Column::new(TypeTag::Int)).unwrap();
        store
            .add_col("even", Column::unconstrained().with_default(|n: &i64| json!(n % 2 == 0)))
            .unwrap();
        for n in 0..10i64 {
            store.add(n, [("n", json!(n))]).unwrap();
        }
        store
    }

    #[test]
    fn test_chain_is_conjunction() {
        let store = numbers();
        let chained = store
            .get([("even", FilterValue::eq(true))])
            .get([("n", FilterValue::predicate(|v| v.as_i64().is_some_and(|n| n > 4)))]);
        assert_eq!(chained.ids().unwrap(), vec![6, 8]);
    }

    #[test]
    fn test_parent_unchanged_by_child() {
        let store = numbers();
        let evens = store.get([("even", true)]);
        let _big = evens.get([("n", 8)]);
        assert_eq!(evens.count().unwrap(), 5);
    }

    #[test]
    fn test_unknown_column_is_error() {
        let store = numbers();
        let err = store.get([("missing", 1)]).eval().unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::UnknownColumn);
    }

    #[test]
    fn test_first_and_only() {
        let store = numbers();
        assert_eq!(*store.get([("even", true)]).first().unwrap(), 0);
        assert_eq!(*store.get([("n", 7)]).only().unwrap(), 7);

        let err = store.get([("even", false)]).only().unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::Cardinality);
        assert!(err.message().contains("even: false"));
        assert!(err.message().contains("found 5"));

        let err = store.get([("n", 42)]).first().unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::Cardinality);
    }

    #[test]
    fn test_iter_restarts_with_current_contents() {
        let store = numbers();
        let evens = store.get([("even", true)]);
        assert_eq!(evens.iter().unwrap().count(), 5);

        store.add(10, [("n", json!(10))]).unwrap();
        let items: Vec<_> = evens.iter().unwrap().collect();
        assert_eq!(items.len(), 6);
        let (meta, obj) = &items[5];
        assert_eq!(**obj, 10);
        assert_eq!(meta.get("n"), Some(&json!(10)));
        assert_eq!(meta.get("even"), Some(&json!(true)));
    }

    #[test]
    fn test_display_lists_levels() {
        let store = numbers();
        let slice = store.get([("even", true)]).get([("n", FilterValue::any_of([1, 2]))]);
        assert_eq!(slice.to_string(), "{even: true} -> {n: [1, 2]}");
    }
}
