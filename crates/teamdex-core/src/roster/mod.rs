//! Roster slots and reconciliation.
//!
//! A roster is an ordered list of slots `0..n`. The slot index is the
//! matching key between what is stored and what the caller asks for: the
//! i-th desired member always lands in slot i, whichever creature sat
//! there before.

mod plan;
mod slot;

pub use plan::{reconcile, MemberCreate, MemberUpdate, Plan, PlanSummary, Retirement};
pub use slot::{RosterSlot, RosterSnapshot};
