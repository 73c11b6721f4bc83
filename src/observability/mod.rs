//! Observability for stores and schemas
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Begin/complete scopes around persistence
//!
//! Output is gated by a process-wide threshold (`Logger::set_min_severity`),
//! `WARN` unless configured otherwise.
//!
//! ```ignore
//! use easyindex::observability::{Event, Logger};
//!
//! Logger::info(Event::ColumnAdded.as_str(), &[("column", "even")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};
