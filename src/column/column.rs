//! A typed attribute channel: domain, default rule and per-object values

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::domain::DomainKind;
use super::filter::FilterValue;
use super::ObjectId;
use crate::errors::{SlicerError, SlicerResult};
use crate::storage::layout::{self, DOMAIN_FILE, METADATA_FILE};

/// Derives an attribute from the object when the caller omits it
pub type DefaultFn<T> = dyn Fn(&T) -> Value + Send + Sync;

/// Attribute store for one tag name.
///
/// A column without a default is mandatory: every insertion into a store
/// holding it must supply a value.
pub struct Column<T> {
    name: String,
    domain: DomainKind,
    default: Option<Arc<DefaultFn<T>>>,
    attributes: RwLock<BTreeMap<ObjectId, Value>>,
}

impl<T> Column<T> {
    /// Creates a mandatory column with the given domain
    pub fn new(domain: impl Into<DomainKind>) -> Self {
        Self {
            name: "column".to_string(),
            domain: domain.into(),
            default: None,
            attributes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a mandatory column accepting any value
    pub fn unconstrained() -> Self {
        Self::new(DomainKind::Unconstrained)
    }

    /// Sets the display name used in errors and persisted paths
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Makes the column optional, deriving omitted values from the object
    pub fn with_default<F>(mut self, default: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(default));
        self
    }

    /// Makes the column optional, storing `null` for omitted values
    pub fn with_null_default(self) -> Self {
        self.with_default(|_| Value::Null)
    }

    /// Returns the column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the domain
    pub fn domain(&self) -> &DomainKind {
        &self.domain
    }

    /// Returns whether every insertion must supply a value
    pub fn is_mandatory(&self) -> bool {
        self.default.is_none()
    }

    /// Copies the definition (name, domain, default) without any attributes
    pub fn definition(&self) -> Self {
        Self {
            name: self.name.clone(),
            domain: self.domain.clone(),
            default: self.default.clone(),
            attributes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Records the attribute of `obj` under `obj_id`.
    ///
    /// `None` means the caller gave no value: the default is applied, or the
    /// insertion fails for a mandatory column. The value is stored without
    /// domain validation.
    pub fn add(&self, obj: &T, obj_id: ObjectId, attribute: Option<Value>) -> SlicerResult<()> {
        let attribute = match attribute {
            Some(value) => value,
            None => match &self.default {
                Some(default) => (**default)(obj),
                None => return Err(SlicerError::property_missing(&self.name, obj_id)),
            },
        };
        self.write().insert(obj_id, attribute);
        Ok(())
    }

    /// Checks a value against the domain without storing it
    pub fn validate_attribute(&self, attribute: &Value) -> SlicerResult<()> {
        self.domain.validate(&self.name, attribute)
    }

    /// Returns whether the attribute recorded for `obj_id` satisfies `filter`
    pub fn check(&self, obj_id: ObjectId, filter: &FilterValue) -> bool {
        filter.matches(self.read().get(&obj_id))
    }

    /// Returns the attribute recorded for `obj_id`
    pub fn attribute(&self, obj_id: ObjectId) -> Option<Value> {
        self.read().get(&obj_id).cloned()
    }

    /// Returns every recorded attribute value, in object-id order
    pub fn values(&self) -> Vec<Value> {
        self.read().values().cloned().collect()
    }

    /// Returns a copy of the attribute map
    pub fn attributes(&self) -> BTreeMap<ObjectId, Value> {
        self.read().clone()
    }

    /// Returns the number of recorded attributes
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns whether no attribute has been recorded
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Writes the domain to `<dir>/domain`
    pub fn save(&self, dir: &Path) -> SlicerResult<()> {
        layout::write_json(&dir.join(DOMAIN_FILE), &self.domain)
    }

    /// Reads a column definition from `<dir>/domain`.
    ///
    /// Defaults are code and are not persisted; the reloaded column stores
    /// `null` for omitted values. The name is taken from the directory.
    pub fn open(dir: &Path) -> SlicerResult<Self> {
        let domain: DomainKind = layout::read_json(&dir.join(DOMAIN_FILE))?;
        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("column")
            .to_string();
        Ok(Self::new(domain).named(name).with_null_default())
    }

    /// Writes the attribute map to `<dir>/metadata`
    pub fn save_metadata(&self, dir: &Path) -> SlicerResult<()> {
        let attributes = self.read();
        layout::write_json(&dir.join(METADATA_FILE), &*attributes)
    }

    /// Replaces the attribute map with the one in `<dir>/metadata`
    pub fn open_metadata(&self, dir: &Path) -> SlicerResult<()> {
        let attributes: BTreeMap<ObjectId, Value> = layout::read_json(&dir.join(METADATA_FILE))?;
        *self.write() = attributes;
        Ok(())
    }

    /// Names the column. The name becomes a directory when the store is saved.
    pub(crate) fn set_name(&mut self, name: &str) -> SlicerResult<()> {
        layout::check_entry_name(name)
            .map_err(|reason| SlicerError::invalid_column_name(name, reason))?;
        self.name = name.to_string();
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ObjectId, Value>> {
        self.attributes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<ObjectId, Value>> {
        self.attributes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("mandatory", &self.is_mandatory())
            .field("attributes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TypeTag;
    use crate::errors::SlicerErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    struct Item {
        weight: u32,
    }

    #[test]
    fn test_new_column_is_empty() {
        let col: Column<Item> = Column::new(DomainKind::enumerated(0..6));
        assert!(col.values().is_empty());
        assert_eq!(col.domain().values().unwrap().len(), 6);
        assert!(col.is_mandatory());
    }

    #[test]
    fn test_mandatory_column_rejects_missing_value() {
        let col: Column<Item> = Column::new(TypeTag::Float).named("numerical");
        let err = col.add(&Item { weight: 1 }, 4, None).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::PropertyMissing);
        assert_eq!(err.column(), Some("numerical"));
        assert_eq!(err.object_id(), Some(4));
        assert!(col.is_empty());
    }

    #[test]
    fn test_default_derives_from_object() {
        let col = Column::new(TypeTag::Int).with_default(|item: &Item| json!(item.weight * 2));
        col.add(&Item { weight: 21 }, 0, None).unwrap();
        col.add(&Item { weight: 1 }, 1, Some(json!(7))).unwrap();
        assert_eq!(col.attribute(0), Some(json!(42)));
        assert_eq!(col.attribute(1), Some(json!(7)));
    }

    #[test]
    fn test_add_does_not_validate() {
        let col: Column<Item> = Column::new(TypeTag::Bool).named("even");
        col.add(&Item { weight: 0 }, 0, Some(json!("not a bool"))).unwrap();
        assert_eq!(col.attribute(0), Some(json!("not a bool")));
        assert!(col.validate_attribute(&json!("not a bool")).is_err());
    }

    #[test]
    fn test_check_absent_id_never_matches() {
        let col: Column<Item> = Column::unconstrained().with_null_default();
        col.add(&Item { weight: 0 }, 0, None).unwrap();

        assert!(col.check(0, &FilterValue::Scalar(Value::Null)));
        assert!(!col.check(1, &FilterValue::Scalar(Value::Null)));
        assert!(!col.check(1, &FilterValue::predicate(|_| true)));
    }

    #[test]
    fn test_values_in_id_order() {
        let col: Column<Item> = Column::unconstrained();
        let item = Item { weight: 0 };
        col.add(&item, 2, Some(json!("c"))).unwrap();
        col.add(&item, 0, Some(json!("a"))).unwrap();
        col.add(&item, 1, Some(json!("b"))).unwrap();
        assert_eq!(col.values(), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_definition_drops_attributes_keeps_default() {
        let col = Column::new(TypeTag::Int)
            .named("w")
            .with_default(|item: &Item| json!(item.weight));
        col.add(&Item { weight: 3 }, 0, None).unwrap();

        let copy = col.definition();
        assert!(copy.is_empty());
        assert_eq!(copy.name(), "w");
        assert_eq!(copy.domain(), col.domain());
        assert!(!copy.is_mandatory());
    }

    #[test]
    fn test_domain_and_metadata_persist_independently() {
        let tmp = TempDir::new().unwrap();
        let schema_dir = tmp.path().join("schema/list_prop");
        let meta_dir = tmp.path().join("meta/list_prop");

        let col: Column<Item> = Column::new(DomainKind::enumerated(0..3)).named("list_prop");
        col.add(&Item { weight: 0 }, 0, Some(json!(2))).unwrap();
        col.add(&Item { weight: 0 }, 5, Some(json!(1))).unwrap();
        col.save(&schema_dir).unwrap();
        col.save_metadata(&meta_dir).unwrap();

        let reopened: Column<Item> = Column::open(&schema_dir).unwrap();
        assert_eq!(reopened.name(), "list_prop");
        assert_eq!(reopened.domain(), col.domain());
        assert!(reopened.is_empty());
        assert!(!reopened.is_mandatory());

        reopened.open_metadata(&meta_dir).unwrap();
        assert_eq!(reopened.attributes(), col.attributes());
    }

    #[test]
    fn test_open_missing_domain_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Column::<Item>::open(&tmp.path().join("nope")).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::NotFound);
    }
}
