//! teamdex core - catalog, roster reconciliation, and persistence.
//!
//! This crate validates team rosters against a creature catalog and keeps
//! the persisted roster in step with what the caller asks for. Every
//! mutation is committed as one sled transaction.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod catalog;
pub mod constraint;
pub mod error;
pub mod roster;
pub mod storage;
pub mod team;

pub use catalog::{
    BaseStats, Catalog, CatalogLookup, CatalogSeed, CreatureRow, ItemRow, MoveQuery, MoveRow,
};
pub use constraint::{ItemRef, MemberSpec, MemberValidator, ValidatedMember};
pub use error::{EntityKind, Error, ErrorCategory, Limit, Result};
pub use roster::{reconcile, Plan, PlanSummary, RosterSlot, RosterSnapshot};
pub use storage::{MemberRow, RosterTransaction, StorageConfig, StorageEngine, TeamRow};
pub use team::{MemberView, TeamListing, TeamService, TeamSummary, TeamView};

/// Maximum number of members on one team.
pub const MAX_SLOTS: usize = 6;

/// Maximum number of moves one member may know.
pub const MAX_MOVES: usize = 4;
