//! Filter values evaluated against one column attribute
//!
//! A filter is a scalar (equality), a list of alternatives (OR), or a
//! predicate. An object with no recorded attribute never matches.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Predicate over a stored attribute. `None` means the predicate could not be
/// evaluated for this value and counts as a non-match.
pub type PredicateFn = dyn Fn(&Value) -> Option<bool> + Send + Sync;

/// One constraint applied to a column
#[derive(Clone)]
pub enum FilterValue {
    /// Attribute equals the value
    Scalar(Value),
    /// Any alternative matches
    AnyOf(Vec<FilterValue>),
    /// Predicate returns true for the attribute
    Predicate(Arc<PredicateFn>),
}

impl FilterValue {
    /// Equality filter
    pub fn eq(value: impl Into<Value>) -> Self {
        FilterValue::Scalar(value.into())
    }

    /// OR of alternatives
    pub fn any_of<I, F>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FilterValue>,
    {
        FilterValue::AnyOf(alternatives.into_iter().map(Into::into).collect())
    }

    /// Infallible predicate
    pub fn predicate<P>(predicate: P) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        FilterValue::Predicate(Arc::new(move |v| Some(predicate(v))))
    }

    /// Predicate that may fail to evaluate (e.g. expects a number, gets a string)
    pub fn try_predicate<P>(predicate: P) -> Self
    where
        P: Fn(&Value) -> Option<bool> + Send + Sync + 'static,
    {
        FilterValue::Predicate(Arc::new(predicate))
    }

    /// Evaluates this filter against an attribute, `None` when the object has
    /// no recorded value for the column
    pub fn matches(&self, attribute: Option<&Value>) -> bool {
        match self {
            FilterValue::AnyOf(alternatives) => alternatives.iter().any(|f| f.matches(attribute)),
            FilterValue::Predicate(predicate) => {
                attribute.and_then(|v| (**predicate)(v)).unwrap_or(false)
            }
            FilterValue::Scalar(expected) => {
                attribute.is_some_and(|actual| values_equal(actual, expected))
            }
        }
    }
}

impl fmt::Debug for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            FilterValue::AnyOf(alts) => f.debug_tuple("AnyOf").field(alts).finish(),
            FilterValue::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Scalar(v) => write!(f, "{}", v),
            FilterValue::AnyOf(alts) => {
                write!(f, "[")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", alt)?;
                }
                write!(f, "]")
            }
            FilterValue::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<Vec<FilterValue>> for FilterValue {
    fn from(alternatives: Vec<FilterValue>) -> Self {
        FilterValue::AnyOf(alternatives)
    }
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_from!(bool, i32, i64, u32, u64, usize, f64, &str, String);

/// Equality between attribute values. Numbers compare by value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return xi == yi;
            }
            if let (Some(xu), Some(yu)) = (x.as_u64(), y.as_u64()) {
                return xu == yu;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(xf), Some(yf)) => xf == yf,
                _ => false,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_equality() {
        let filter = FilterValue::eq("Alice");
        assert!(filter.matches(Some(&json!("Alice"))));
        assert!(!filter.matches(Some(&json!("Bob"))));
    }

    #[test]
    fn test_no_string_number_coercion() {
        let filter = FilterValue::eq(123);
        assert!(!filter.matches(Some(&json!("123"))));
        assert!(filter.matches(Some(&json!(123))));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(FilterValue::eq(10).matches(Some(&json!(10.0))));
        assert!(FilterValue::eq(2.5).matches(Some(&json!(2.5))));
        assert!(!FilterValue::eq(2).matches(Some(&json!(2.5))));
    }

    #[test]
    fn test_absent_attribute_never_matches() {
        assert!(!FilterValue::eq(1).matches(None));
        assert!(!FilterValue::Scalar(Value::Null).matches(None));
        assert!(!FilterValue::predicate(|_| true).matches(None));
        assert!(!FilterValue::any_of([FilterValue::eq(1), FilterValue::Scalar(Value::Null)]).matches(None));
    }

    #[test]
    fn test_stored_null_matches_null_filter() {
        assert!(FilterValue::Scalar(Value::Null).matches(Some(&Value::Null)));
    }

    #[test]
    fn test_any_of_is_or() {
        let filter = FilterValue::any_of([
            FilterValue::predicate(|v| v.as_f64().is_some_and(|n| n < 10.0)),
            FilterValue::eq(99),
        ]);
        assert!(filter.matches(Some(&json!(3))));
        assert!(filter.matches(Some(&json!(99))));
        assert!(!filter.matches(Some(&json!(50))));
    }

    #[test]
    fn test_failed_predicate_is_non_match() {
        let filter = FilterValue::try_predicate(|v| v.as_f64().map(|n| n > 0.0));
        assert!(filter.matches(Some(&json!(1))));
        assert!(!filter.matches(Some(&json!("one"))));
    }

    #[test]
    fn test_display() {
        let filter = FilterValue::any_of([FilterValue::eq(1), FilterValue::predicate(|_| true)]);
        assert_eq!(filter.to_string(), "[1, <predicate>]");
    }
}
