//! The object store
//!
//! A [`Slicer`] owns a growable array of object slots and a set of named
//! columns. Ids are assigned in insertion order starting at 0 and are never
//! reused; a failed insertion leaves a tombstone at its id.
//!
//! Persistence writes three independent subtrees plus a manifest, see
//! [`crate::storage`].

mod persist;
mod store;

pub use store::{Slicer, Validator};
