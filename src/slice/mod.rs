//! Composable, lazily evaluated filters
//!
//! `store.get(a).get(b)` builds a chain of immutable nodes. Nothing runs
//! until `all`, `eval`, `serialize`, `first`, `only`, `count` or `iter`:
//!
//! - properties within one `get` are ANDed
//! - levels of the chain are ANDed
//! - a list value ORs its alternatives for that column
//!
//! Tombstoned ids never appear in any result. `for item in &slice` yields
//! `SlicerResult` items, since a filter may name a missing column;
//! `for (meta, obj) in &store` cannot fail.

mod chain;
mod iter;
mod record;

pub use chain::{Properties, Slice};
pub use iter::{SliceIntoIter, SliceIter};
pub use record::{ObjectMeta, ObjectRecord};

pub(crate) use chain::collect_properties;
