//! Observable store events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events emitted by stores and schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Columns
    /// Column registered on a store
    ColumnAdded,
    /// Column registered on a schema
    SchemaColumnAdded,
    /// Store subscribed to a schema
    SchemaSubscribed,

    // Objects
    /// Object inserted
    ObjectAdded,
    /// Object rejected; its id is now a tombstone
    ObjectRejected,

    // Persistence
    /// Store written to disk
    StoreSaved,
    /// Store read from disk
    StoreOpened,
    /// Directory without a manifest, objects loaded by probing
    LegacyLayout,
    /// Metadata file does not match its manifest checksum
    ChecksumMismatch,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ColumnAdded => "COLUMN_ADDED",
            Event::SchemaColumnAdded => "SCHEMA_COLUMN_ADDED",
            Event::SchemaSubscribed => "SCHEMA_SUBSCRIBED",
            Event::ObjectAdded => "OBJECT_ADDED",
            Event::ObjectRejected => "OBJECT_REJECTED",
            Event::StoreSaved => "STORE_SAVED",
            Event::StoreOpened => "STORE_OPENED",
            Event::LegacyLayout => "LEGACY_LAYOUT",
            Event::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Returns true if this event indicates untrusted persisted data
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ChecksumMismatch)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
