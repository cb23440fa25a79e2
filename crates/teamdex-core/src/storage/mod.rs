//! Storage layer for teamdex.
//!
//! Teams, members and member moves live in sled trees next to the catalog.
//! Reads go straight to the engine; writes are queued on a
//! [`RosterTransaction`] and committed atomically.

mod config;
mod engine;
mod record;
mod transaction;

pub mod key;

pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use record::{MemberRow, Row, TeamRow};
pub(crate) use record::row_codec;
pub use transaction::{RosterOp, RosterTransaction};
