//! Typed tag columns
//!
//! A column attaches one attribute to objects in a store:
//!
//! - **Domain**: unconstrained, an enumerated value list, or a type
//! - **Default**: derives a value from the object when none is given;
//!   columns without one are mandatory
//! - **Attributes**: sparse map from object id to value
//! - **Filters**: scalar equality, OR-lists and predicates
//!
//! Domains and attribute maps persist to separate files so a schema can be
//! shipped without data.

#[allow(clippy::module_inception)]
mod column;
mod domain;
mod filter;

/// Position of an object in its store, assigned at insertion and never reused
pub type ObjectId = usize;

pub use column::{Column, DefaultFn};
pub use domain::{json_type_name, DomainKind, TypeTag};
pub use filter::{values_equal, FilterValue, PredicateFn};
