//! Core error types.

use std::fmt;

use thiserror::Error;

use crate::{MAX_MOVES, MAX_SLOTS};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Creature,
    Move,
    Item,
    Stats,
    Team,
    TeamMember,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Creature => "creature",
            EntityKind::Move => "move",
            EntityKind::Item => "item",
            EntityKind::Stats => "stats",
            EntityKind::Team => "team",
            EntityKind::TeamMember => "team member",
        };
        f.write_str(name)
    }
}

/// A structural cap on the shape of a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    /// Members per team.
    RosterSlots,
    /// Moves per member.
    Moveset,
}

impl Limit {
    /// The largest count this limit allows.
    pub const fn max(self) -> usize {
        match self {
            Limit::RosterSlots => MAX_SLOTS,
            Limit::Moveset => MAX_MOVES,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::RosterSlots => f.write_str("team members"),
            Limit::Moveset => f.write_str("moves per member"),
        }
    }
}

/// Stable classification of errors for callers that need to tell bad input
/// apart from server-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A named record does not exist.
    NotFound,
    /// A team with the requested name already exists.
    Conflict,
    /// The request itself is not acceptable.
    Invalid,
    /// Nothing was committed; the same request may be retried.
    Retryable,
    /// Storage or encoding failure.
    Internal,
}

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A catalog entry, team or member was not found.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was being looked up.
        kind: EntityKind,
        /// The name (or id) that was requested.
        name: String,
    },

    /// A team with this name already exists.
    #[error("team name already exists: {team}")]
    Conflict {
        /// The duplicate team name.
        team: String,
    },

    /// The ability is not in the creature's ability list.
    #[error("{creature} cannot have the ability {ability}")]
    IllegalAbility {
        /// Creature name.
        creature: String,
        /// Rejected ability.
        ability: String,
    },

    /// The creature has no legality link to the move.
    #[error("{creature} cannot learn {mv}")]
    IllegalMove {
        /// Creature name.
        creature: String,
        /// Rejected move.
        mv: String,
    },

    /// The same move appears twice in one member's moveset.
    #[error("{creature} lists {mv} more than once")]
    DuplicateMove {
        /// Creature name.
        creature: String,
        /// Repeated move.
        mv: String,
    },

    /// A roster or moveset exceeds its cap.
    #[error("too many {limit}: {requested} requested, at most {max}", max = .limit.max())]
    StructuralLimit {
        /// Which cap was exceeded.
        limit: Limit,
        /// How many were requested.
        requested: usize,
    },

    /// The transaction was aborted and nothing was written.
    #[error("transaction failure: {0}")]
    TransactionFailure(String),

    /// Malformed input that is not covered by a more specific kind.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// The stable category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::IllegalAbility { .. }
            | Error::IllegalMove { .. }
            | Error::DuplicateMove { .. }
            | Error::StructuralLimit { .. }
            | Error::InvalidInput(_) => ErrorCategory::Invalid,
            Error::TransactionFailure(_) => ErrorCategory::Retryable,
            Error::Storage(_) | Error::Serialization(_) | Error::Deserialization(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::IllegalAbility {
            creature: "bulbasaur".into(),
            ability: "blaze".into(),
        };
        assert_eq!(err.to_string(), "bulbasaur cannot have the ability blaze");

        let err = Error::StructuralLimit {
            limit: Limit::RosterSlots,
            requested: 7,
        };
        assert_eq!(
            err.to_string(),
            "too many team members: 7 requested, at most 6"
        );

        let err = Error::not_found(EntityKind::TeamMember, "pikachu");
        assert_eq!(err.to_string(), "team member not found: pikachu");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            Error::not_found(EntityKind::Item, "x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::Conflict { team: "a".into() }.category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            Error::DuplicateMove {
                creature: "a".into(),
                mv: "b".into()
            }
            .category(),
            ErrorCategory::Invalid
        );
        assert!(Error::TransactionFailure("stale".into()).is_retryable());
        assert_eq!(
            Error::Serialization("x".into()).category(),
            ErrorCategory::Internal
        );
    }
}
