//! Requested and validated team members.

use serde::{Deserialize, Serialize};

use crate::catalog::MoveRow;

/// A team member as requested by a caller.
///
/// Blank ability, item and move strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Creature name.
    pub creature: String,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub moves: Vec<String>,
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

impl MemberSpec {
    /// A member with no ability, item or moves.
    pub fn new(creature: impl Into<String>) -> Self {
        Self {
            creature: creature.into(),
            ..Self::default()
        }
    }

    /// Set the ability.
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = Some(ability.into());
        self
    }

    /// Set the held item.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Set the moveset.
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// The requested ability, if not blank.
    pub fn ability(&self) -> Option<&str> {
        self.ability.as_deref().filter(|a| present(a))
    }

    /// The requested item, if not blank.
    pub fn item(&self) -> Option<&str> {
        self.item.as_deref().filter(|i| present(i))
    }

    /// The requested move names, skipping blanks, in order.
    pub fn moves(&self) -> impl Iterator<Item = &str> {
        self.moves.iter().map(String::as_str).filter(|m| present(m))
    }
}

/// A held item resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub id: u32,
    pub name: String,
}

/// A member whose creature, ability, moves and item are all legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMember {
    /// Catalog id of the creature.
    pub creature_id: u32,
    /// Creature name.
    pub creature: String,
    pub ability: Option<String>,
    pub item: Option<ItemRef>,
    /// Resolved moves, in the order requested.
    pub moves: Vec<MoveRow>,
}

impl ValidatedMember {
    /// Catalog id of the held item.
    pub fn item_id(&self) -> Option<u32> {
        self.item.as_ref().map(|item| item.id)
    }

    /// Move names in the order requested.
    pub fn move_names(&self) -> Vec<String> {
        self.moves.iter().map(|mv| mv.name.clone()).collect()
    }
}
