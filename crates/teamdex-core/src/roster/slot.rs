//! Persisted roster snapshot.

use crate::storage::{MemberRow, TeamRow};

/// One occupied slot of a stored roster, with its moves resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSlot {
    /// Slot index, 0-based.
    pub slot: u8,
    /// Id of the member occupying the slot.
    pub member_id: u64,
    /// The member row as stored.
    pub member: MemberRow,
    /// Move names in stored order.
    pub moves: Vec<String>,
}

impl RosterSlot {
    /// Build a slot from a member row and its moves.
    pub fn new(member: MemberRow, moves: Vec<String>) -> Self {
        Self {
            slot: member.slot,
            member_id: member.id,
            member,
            moves,
        }
    }
}

/// A team row and its roster, read at the same version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSnapshot {
    /// The team as stored; `version` is the one the slots belong to.
    pub team: TeamRow,
    /// Occupied slots ordered by slot index.
    pub slots: Vec<RosterSlot>,
}
