//! Portable column definitions
//!
//! A [`Schema`] is exported from a store with `Slicer::schema()`, saved on
//! its own, and used to give other stores the same columns:
//!
//! - `subscribe` copies every existing column into each store
//! - `add_col` pushes new columns to every live subscriber
//! - nothing flows from subscribers back into the schema

mod loader;
mod registry;

pub use registry::Schema;
