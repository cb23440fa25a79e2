//! Read projections returned by the team service.

use serde::{Deserialize, Serialize};

/// Outcome of a committed create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_id: u64,
    pub team_name: String,
    /// Version after the commit.
    pub version: u64,
    /// Number of members on the team after the commit.
    pub members: usize,
}

/// One team in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamListing {
    pub team_id: u64,
    pub team_name: String,
}

/// A team member with catalog references resolved to names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    /// Member id. Stable for as long as the member keeps its slot.
    pub slot_id: u64,
    /// Roster position, 0-based.
    pub slot: u8,
    pub creature_name: String,
    pub ability: Option<String>,
    pub item_name: Option<String>,
    pub move_names: Vec<String>,
}

/// A team and its members ordered by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamView {
    pub id: u64,
    pub name: String,
    pub version: u64,
    pub members: Vec<MemberView>,
}
