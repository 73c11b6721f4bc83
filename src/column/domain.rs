//! Column domains: the constraint legal attribute values must satisfy
//!
//! Supported type tags:
//! - string: UTF-8 string
//! - int: integer number
//! - bool: boolean
//! - float: any number (integers widen)
//! - array: JSON array
//! - object: JSON object

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::values_equal;
use crate::errors::{SlicerError, SlicerResult};

/// Type constraint for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// UTF-8 string
    String,
    /// Integer number
    Int,
    /// Boolean
    Bool,
    /// Any number
    Float,
    /// JSON array
    Array,
    /// JSON object
    Object,
}

impl TypeTag {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::Float => "float",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    /// Returns whether `value` has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeTag::String => value.is_string(),
            TypeTag::Int => value.is_i64() || value.is_u64(),
            TypeTag::Bool => value.is_boolean(),
            TypeTag::Float => value.is_number(),
            TypeTag::Array => value.is_array(),
            TypeTag::Object => value.is_object(),
        }
    }
}

/// The set or type legal attribute values of a column must satisfy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "constraint", rename_all = "lowercase")]
pub enum DomainKind {
    /// Any value is legal
    #[default]
    Unconstrained,
    /// Only the listed values are legal, in this order
    Enumerated(Vec<Value>),
    /// Only values of this type are legal
    Type(TypeTag),
}

impl DomainKind {
    /// Materializes any enumerable input (a range, a slice, an iterator) into an
    /// ordered enumerated domain
    pub fn enumerated<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        DomainKind::Enumerated(values.into_iter().map(Into::into).collect())
    }

    /// Domain constrained to one type
    pub fn of_type(tag: TypeTag) -> Self {
        DomainKind::Type(tag)
    }

    /// Returns the enumerated values, if this is an enumerated domain
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            DomainKind::Enumerated(values) => Some(values),
            _ => None,
        }
    }

    /// Checks `value` against this domain
    pub fn validate(&self, column: &str, value: &Value) -> SlicerResult<()> {
        match self {
            DomainKind::Unconstrained => Ok(()),
            DomainKind::Enumerated(values) => {
                if values.iter().any(|v| values_equal(v, value)) {
                    Ok(())
                } else {
                    Err(SlicerError::attribute_rejected(
                        column,
                        format!("one of {}", Value::Array(values.clone())),
                        value.to_string(),
                    ))
                }
            }
            DomainKind::Type(tag) => {
                if tag.accepts(value) {
                    Ok(())
                } else {
                    Err(SlicerError::attribute_rejected(
                        column,
                        tag.type_name(),
                        json_type_name(value),
                    ))
                }
            }
        }
    }
}

impl From<TypeTag> for DomainKind {
    fn from(tag: TypeTag) -> Self {
        DomainKind::Type(tag)
    }
}

/// Returns the JSON type name of a value
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlicerErrorCode;
    use serde_json::json;

    #[test]
    fn test_enumerated_materializes_range() {
        let domain = DomainKind::enumerated(0..6);
        assert_eq!(
            domain.values().unwrap(),
            &[json!(0), json!(1), json!(2), json!(3), json!(4), json!(5)]
        );
    }

    #[test]
    fn test_unconstrained_accepts_anything() {
        let domain = DomainKind::Unconstrained;
        assert!(domain.validate("c", &json!(null)).is_ok());
        assert!(domain.validate("c", &json!({"a": [1]})).is_ok());
    }

    #[test]
    fn test_enumerated_membership() {
        let domain = DomainKind::enumerated(["red", "green"]);
        assert!(domain.validate("color", &json!("red")).is_ok());

        let err = domain.validate("color", &json!("blue")).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::ValidatorFailed);
        assert_eq!(err.column(), Some("color"));
    }

    #[test]
    fn test_enumerated_numeric_membership_ignores_representation() {
        let domain = DomainKind::enumerated(0..3);
        assert!(domain.validate("n", &json!(2.0)).is_ok());
    }

    #[test]
    fn test_type_constraint() {
        let float = DomainKind::of_type(TypeTag::Float);
        assert!(float.validate("x", &json!(1.5)).is_ok());
        assert!(float.validate("x", &json!(3)).is_ok());
        assert!(float.validate("x", &json!("3")).is_err());

        let int = DomainKind::of_type(TypeTag::Int);
        assert!(int.validate("x", &json!(3)).is_ok());
        assert!(int.validate("x", &json!(3.5)).is_err());

        let boolean: DomainKind = TypeTag::Bool.into();
        assert!(boolean.validate("x", &json!(true)).is_ok());
        assert!(boolean.validate("x", &json!(1)).is_err());
    }

    #[test]
    fn test_domain_json_shape() {
        let json = serde_json::to_value(DomainKind::of_type(TypeTag::Float)).unwrap();
        assert_eq!(json, json!({"kind": "type", "constraint": "float"}));

        let json = serde_json::to_value(DomainKind::Unconstrained).unwrap();
        assert_eq!(json, json!({"kind": "unconstrained"}));

        let back: DomainKind =
            serde_json::from_value(json!({"kind": "enumerated", "constraint": [1, 2]})).unwrap();
        assert_eq!(back, DomainKind::enumerated([1, 2]));
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!("s")), "string");
        assert_eq!(json_type_name(&json!(null)), "null");
    }
}
