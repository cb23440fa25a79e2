//! Row types for stored values.

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;

/// A value stored in a sled tree.
pub trait Row: Sized {
    /// Serialize the row to bytes using rkyv.
    fn to_bytes(&self) -> Result<Vec<u8>, Error>;

    /// Deserialize a row from bytes using rkyv.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>;
}

/// Implement [`Row`] for rkyv-archivable types.
macro_rules! row_codec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::storage::Row for $ty {
                fn to_bytes(&self) -> Result<Vec<u8>, $crate::error::Error> {
                    rkyv::to_bytes::<rkyv::rancor::Error>(self)
                        .map(|v| v.to_vec())
                        .map_err(|e| $crate::error::Error::Serialization(e.to_string()))
                }

                fn from_bytes(bytes: &[u8]) -> Result<Self, $crate::error::Error> {
                    // sled values carry no alignment guarantee
                    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
                    aligned.extend_from_slice(bytes);
                    rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
                        .map_err(|e| $crate::error::Error::Deserialization(e.to_string()))
                }
            }
        )+
    };
}

pub(crate) use row_codec;

/// A persisted team.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct TeamRow {
    /// Team id.
    pub id: u64,
    /// Unique team name.
    pub name: String,
    /// Bumped on every committed mutation.
    pub version: u64,
}

impl TeamRow {
    /// A freshly created team, before its first commit.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            version: 0,
        }
    }
}

/// A persisted team member.
///
/// Move names are kept in their own tree; `move_count` records how many
/// rows this member owns there.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct MemberRow {
    /// Member id.
    pub id: u64,
    /// Owning team.
    pub team_id: u64,
    /// Roster slot, 0-based.
    pub slot: u8,
    /// Catalog id of the creature.
    pub creature_id: u32,
    /// Chosen ability, if any.
    pub ability: Option<String>,
    /// Catalog id of the held item, if any.
    pub item_id: Option<u32>,
    /// Number of move rows owned by this member.
    pub move_count: u8,
}

row_codec!(TeamRow, MemberRow);
