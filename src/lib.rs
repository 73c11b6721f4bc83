//! easyindex - an in-memory object store with typed tag columns
//!
//! Objects are inserted into a [`Slicer`] together with attribute values for
//! its [`Column`]s, then retrieved by chaining filters into a [`Slice`]:
//!
//! ```ignore
//! let store: Slicer<Item> = Slicer::new();
//! store.add_col("even", Column::new(TypeTag::Bool))?;
//! store.add(item, [("even", json!(true))])?;
//! let evens = store.get([("even", true)]).eval()?;
//! ```
//!
//! A [`Schema`] carries column definitions between stores, and a store saves
//! to and reopens from a directory.

pub mod cli;
pub mod column;
pub mod config;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod slice;
pub mod slicer;
pub mod storage;

pub use column::{Column, DomainKind, FilterValue, ObjectId, TypeTag};
pub use config::SlicerConfig;
pub use errors::{SlicerError, SlicerErrorCode, SlicerResult};
pub use schema::Schema;
pub use slice::{ObjectMeta, ObjectRecord, Slice, SliceIntoIter, SliceIter};
pub use slicer::Slicer;
pub use storage::{JsonCodec, ObjectCodec, Persist, SelfCodec};
