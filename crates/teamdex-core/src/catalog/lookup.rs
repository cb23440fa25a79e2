//! Read-only catalog interface consumed by the validator and team service.

use std::collections::HashSet;

use super::{CreatureRow, ItemRow, MoveRow};
use crate::error::Result;

/// Lookups the roster engine needs from a catalog.
///
/// Every lookup answers "found" or "not found"; only storage failures are
/// errors.
pub trait CatalogLookup {
    /// Find a creature by name.
    fn find_creature(&self, name: &str) -> Result<Option<CreatureRow>>;

    /// Find a move by name.
    fn find_move(&self, name: &str) -> Result<Option<MoveRow>>;

    /// Find an item by name.
    fn find_item(&self, name: &str) -> Result<Option<ItemRow>>;

    /// Names of every move the creature may learn. Empty if none are linked.
    fn legal_moves(&self, creature: &str) -> Result<HashSet<String>>;

    /// Resolve a creature by catalog id.
    fn creature_by_id(&self, id: u32) -> Result<Option<CreatureRow>>;

    /// Resolve an item by catalog id.
    fn item_by_id(&self, id: u32) -> Result<Option<ItemRow>>;
}
