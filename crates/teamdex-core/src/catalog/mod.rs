//! Reference catalog for teamdex.
//!
//! The catalog stores creatures, moves, items and the legality links
//! between creatures and moves. The roster engine only reads it, through
//! [`CatalogLookup`].

mod catalog;
mod entity;
mod lookup;
mod query;
mod seed;

pub use catalog::Catalog;
pub use entity::{BaseStats, CreatureRow, ItemRow, MoveRow};
pub use lookup::CatalogLookup;
pub use query::{MoveQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use seed::{CatalogSeed, LinkSeed, SeedSummary};
