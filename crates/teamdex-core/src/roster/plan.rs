//! Reconciliation plans.
//!
//! [`reconcile`] diffs a desired member list against a stored roster and
//! returns a [`Plan`] of per-slot actions. It never touches storage; the
//! plan is applied by a [`RosterTransaction`](crate::storage::RosterTransaction).

use std::collections::BTreeMap;
use std::fmt;

use super::RosterSlot;
use crate::constraint::ValidatedMember;
use crate::MAX_SLOTS;

/// Overwrite an existing member in place, keeping its id.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberUpdate {
    /// Slot being rewritten.
    pub slot: u8,
    /// Id of the member that keeps the slot.
    pub member_id: u64,
    /// New contents of the slot.
    pub member: ValidatedMember,
}

/// Insert a new member into a previously empty slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberCreate {
    /// Slot being filled.
    pub slot: u8,
    /// Contents of the new member.
    pub member: ValidatedMember,
}

/// Remove a member whose slot is past the end of the desired list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retirement {
    /// Slot being vacated.
    pub slot: u8,
    /// Member being removed.
    pub member_id: u64,
}

/// The create/update/retire actions that turn a stored roster into the
/// desired one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Slots kept by their current member, with new contents.
    pub updates: Vec<MemberUpdate>,
    /// Slots filled by new members, at the tail of the roster.
    pub creates: Vec<MemberCreate>,
    /// Members removed because the desired roster is shorter.
    pub retirements: Vec<Retirement>,
}

/// Action counts of a [`Plan`], for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub updated: usize,
    pub created: usize,
    pub retired: usize,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} created, {} retired",
            self.updated, self.created, self.retired
        )
    }
}

impl Plan {
    /// Whether the plan has no actions at all.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.retirements.is_empty()
    }

    /// Count actions by kind.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            updated: self.updates.len(),
            created: self.creates.len(),
            retired: self.retirements.len(),
        }
    }

    /// Number of slots the roster has once the plan is applied.
    pub fn roster_len(&self) -> usize {
        self.updates.len() + self.creates.len()
    }
}

/// Compute the plan that turns `existing` into `desired`.
///
/// Matching is by slot index: desired member `i` updates the member stored
/// in slot `i` if there is one and is created otherwise. Stored members in
/// slots the desired list does not reach are retired. An empty `desired`
/// retires the whole roster.
///
/// `desired` must already respect [`MAX_SLOTS`]; the team service rejects
/// longer lists before planning.
pub fn reconcile(existing: &[RosterSlot], desired: Vec<ValidatedMember>) -> Plan {
    debug_assert!(desired.len() <= MAX_SLOTS);

    let mut by_slot: BTreeMap<u8, &RosterSlot> =
        existing.iter().map(|slot| (slot.slot, slot)).collect();
    let mut plan = Plan::default();

    for (slot, member) in (0u8..).zip(desired) {
        match by_slot.remove(&slot) {
            Some(current) => plan.updates.push(MemberUpdate {
                slot,
                member_id: current.member_id,
                member,
            }),
            None => plan.creates.push(MemberCreate { slot, member }),
        }
    }

    // Whatever was not claimed above lies past the end of the desired list.
    plan.retirements = by_slot
        .into_values()
        .map(|current| Retirement {
            slot: current.slot,
            member_id: current.member_id,
        })
        .collect();

    plan
}
