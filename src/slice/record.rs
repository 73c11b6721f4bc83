//! Serialized view of one object in a slice

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::column::ObjectId;

/// Column attributes of one object, keyed by column name
pub type ObjectMeta = BTreeMap<String, Value>;

/// One surviving object: its id, its attributes and optionally the object
#[derive(Debug, Serialize)]
pub struct ObjectRecord<T> {
    /// Object id
    pub id: ObjectId,
    /// Attribute per column; `null` where the object has none
    pub meta: ObjectMeta,
    /// The object itself, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obj: Option<Arc<T>>,
}

impl<T> ObjectRecord<T> {
    /// Creates a record
    pub fn new(id: ObjectId, meta: ObjectMeta, obj: Option<Arc<T>>) -> Self {
        Self { id, meta, obj }
    }

    /// Returns the object id
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the attribute recorded for `column`
    pub fn attribute(&self, column: &str) -> Option<&Value> {
        self.meta.get(column)
    }
}

impl<T> Clone for ObjectRecord<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            meta: self.meta.clone(),
            obj: self.obj.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_without_object() {
        let mut meta = ObjectMeta::new();
        meta.insert("even".to_string(), json!(true));
        let record: ObjectRecord<String> = ObjectRecord::new(4, meta, None);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": 4, "meta": {"even": true}})
        );
    }

    #[test]
    fn test_record_serializes_object() {
        let record = ObjectRecord::new(0, ObjectMeta::new(), Some(Arc::new("payload".to_string())));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": 0, "meta": {}, "obj": "payload"})
        );
        assert_eq!(record.attribute("even"), None);
    }
}
