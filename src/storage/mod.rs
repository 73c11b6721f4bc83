//! On-disk persistence for stores
//!
//! A saved store is a directory with three independently reloadable
//! subtrees plus a manifest:
//!
//! - `schema/<column>/domain`: column definitions
//! - `meta/<column>/metadata`: attribute maps (object id -> value)
//! - `objects/<id>/`: one payload per object, or a `tombstone` marker
//!
//! Writers go through [`layout::write_atomic`], so a crash never leaves a
//! half-written JSON file in place. The manifest is written last.

pub mod checksum;
pub mod codec;
pub mod layout;
pub mod manifest;

pub use codec::{JsonCodec, ObjectCodec, Persist, SelfCodec, DEFAULT_OBJECT_FILE};
pub use layout::StoreLayout;
pub use manifest::{StoreManifest, FORMAT_VERSION};
