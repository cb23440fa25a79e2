//! Atomic roster mutations.

use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
    TransactionalTree,
};
use sled::Transactional;
use tracing::warn;

use super::key::{decode_id, id_key, SlotKey};
use super::{MemberRow, Row, StorageEngine, TeamRow};
use crate::error::Error;
use crate::roster::Plan;

/// A pending write in a roster transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOp {
    /// Write a member into a slot and replace its moveset.
    ///
    /// `member_id` is `None` for a new member; an id is allocated on commit.
    Put {
        /// Roster slot.
        slot: u8,
        /// Existing member to overwrite in place.
        member_id: Option<u64>,
        /// Catalog id of the creature.
        creature_id: u32,
        /// Chosen ability.
        ability: Option<String>,
        /// Catalog id of the held item.
        item_id: Option<u32>,
        /// Move names, in order.
        moves: Vec<String>,
    },
    /// Delete a member's moves, then the member and its slot.
    Retire {
        /// Roster slot being vacated.
        slot: u8,
        /// Member being removed.
        member_id: u64,
    },
}

#[derive(Debug, Clone)]
enum Target {
    /// Create a team with this name.
    Create(String),
    /// Mutate a team, expecting it to still be at the snapshot's version.
    Existing(TeamRow),
}

/// A transaction scoped to a single team.
///
/// Operations are collected and executed atomically on commit: either every
/// row is written or none is. Mutations of an existing team carry the
/// version the caller read; if another commit got there first the
/// transaction aborts with [`Error::TransactionFailure`].
pub struct RosterTransaction<'a> {
    engine: &'a StorageEngine,
    target: Target,
    ops: Vec<RosterOp>,
    delete_team: bool,
}

/// Transactional views of the five `team:*` trees.
type TxTrees = (
    TransactionalTree,
    TransactionalTree,
    TransactionalTree,
    TransactionalTree,
    TransactionalTree,
);

impl<'a> RosterTransaction<'a> {
    pub(crate) fn create(engine: &'a StorageEngine, name: String) -> Self {
        Self {
            engine,
            target: Target::Create(name),
            ops: Vec::new(),
            delete_team: false,
        }
    }

    pub(crate) fn existing(engine: &'a StorageEngine, team: TeamRow) -> Self {
        Self {
            engine,
            target: Target::Existing(team),
            ops: Vec::new(),
            delete_team: false,
        }
    }

    /// Queue a single operation.
    pub fn push(&mut self, op: RosterOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Queue every action of a reconciliation plan.
    pub fn apply(&mut self, plan: &Plan) -> &mut Self {
        for update in &plan.updates {
            self.ops.push(RosterOp::Put {
                slot: update.slot,
                member_id: Some(update.member_id),
                creature_id: update.member.creature_id,
                ability: update.member.ability.clone(),
                item_id: update.member.item_id(),
                moves: update.member.move_names(),
            });
        }
        for create in &plan.creates {
            self.ops.push(RosterOp::Put {
                slot: create.slot,
                member_id: None,
                creature_id: create.member.creature_id,
                ability: create.member.ability.clone(),
                item_id: create.member.item_id(),
                moves: create.member.move_names(),
            });
        }
        for retirement in &plan.retirements {
            self.ops.push(RosterOp::Retire {
                slot: retirement.slot,
                member_id: retirement.member_id,
            });
        }
        self
    }

    /// Remove the team row and its name once the queued ops have run.
    ///
    /// Callers retire every member first; a team is never deleted with
    /// members still attached.
    pub fn delete_team(&mut self) -> &mut Self {
        self.delete_team = true;
        self
    }

    /// Get the pending operations.
    pub fn operations(&self) -> &[RosterOp] {
        &self.ops
    }

    /// Commit the transaction atomically.
    ///
    /// Returns the team row as committed (with its bumped version), or the
    /// removed row when the team was deleted.
    pub fn commit(self) -> Result<TeamRow, Error> {
        let trees = (
            self.engine.teams_tree(),
            self.engine.team_names_tree(),
            self.engine.members_tree(),
            self.engine.roster_tree(),
            self.engine.member_moves_tree(),
        );

        let result: Result<TeamRow, TransactionError<Error>> =
            trees.transaction(|trees| self.execute(trees));

        match result {
            Ok(team) => Ok(team),
            Err(TransactionError::Abort(e)) => {
                if e.is_retryable() {
                    warn!(error = %e, "roster transaction rejected");
                }
                Err(e)
            }
            Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
        }
    }

    /// Body of the sled transaction. May run more than once on conflict.
    fn execute(&self, trees: &TxTrees) -> ConflictableTransactionResult<TeamRow, Error> {
        let (teams, names, members, roster, moves) = trees;

        let mut team = match &self.target {
            Target::Create(name) => {
                if names.get(name.as_bytes())?.is_some() {
                    return abort(Error::Conflict { team: name.clone() });
                }
                let id = teams.generate_id()?;
                names.insert(name.as_bytes(), &id_key(id)[..])?;
                TeamRow::new(id, name.clone())
            }
            Target::Existing(snapshot) => {
                let current = match teams.get(id_key(snapshot.id))? {
                    Some(bytes) => TeamRow::from_bytes(&bytes).map_err(abort_with)?,
                    None => {
                        return abort(Error::TransactionFailure(format!(
                            "team {} was deleted concurrently",
                            snapshot.name
                        )))
                    }
                };
                if current.version != snapshot.version {
                    return abort(Error::TransactionFailure(format!(
                        "team {} changed from version {} to {}",
                        snapshot.name, snapshot.version, current.version
                    )));
                }
                current
            }
        };

        for op in &self.ops {
            match op {
                RosterOp::Put {
                    slot,
                    member_id,
                    creature_id,
                    ability,
                    item_id,
                    moves: move_names,
                } => {
                    let id = match member_id {
                        Some(id) => {
                            clear_moves(members, moves, *id)?;
                            *id
                        }
                        None => members.generate_id()?,
                    };

                    let move_count = u8::try_from(move_names.len()).map_err(|_| {
                        ConflictableTransactionError::Abort(Error::InvalidInput(format!(
                            "{} moves do not fit one member",
                            move_names.len()
                        )))
                    })?;

                    let row = MemberRow {
                        id,
                        team_id: team.id,
                        slot: *slot,
                        creature_id: *creature_id,
                        ability: ability.clone(),
                        item_id: *item_id,
                        move_count,
                    };
                    members.insert(&id_key(id)[..], row.to_bytes().map_err(abort_with)?)?;
                    roster.insert(&SlotKey::new(team.id, *slot).encode()[..], &id_key(id)[..])?;

                    for (pos, name) in (0u8..).zip(move_names) {
                        moves.insert(&SlotKey::new(id, pos).encode()[..], name.as_bytes())?;
                    }
                }
                RosterOp::Retire { slot, member_id } => {
                    clear_moves(members, moves, *member_id)?;
                    members.remove(&id_key(*member_id)[..])?;

                    // Only vacate the slot if it still points at this member.
                    let slot_key = SlotKey::new(team.id, *slot).encode();
                    let occupant = roster.get(slot_key)?.and_then(|v| decode_id(&v));
                    if occupant == Some(*member_id) {
                        roster.remove(&slot_key[..])?;
                    }
                }
            }
        }

        if self.delete_team {
            teams.remove(&id_key(team.id)[..])?;
            names.remove(team.name.as_bytes())?;
            return Ok(team);
        }

        team.version += 1;
        teams.insert(&id_key(team.id)[..], team.to_bytes().map_err(abort_with)?)?;
        Ok(team)
    }
}

/// Remove every move row owned by `member_id`.
fn clear_moves(
    members: &TransactionalTree,
    moves: &TransactionalTree,
    member_id: u64,
) -> ConflictableTransactionResult<(), Error> {
    let Some(bytes) = members.get(id_key(member_id))? else {
        return abort(Error::TransactionFailure(format!(
            "member {member_id} disappeared during the transaction"
        )));
    };
    let member = MemberRow::from_bytes(&bytes).map_err(abort_with)?;
    for pos in 0..member.move_count {
        moves.remove(&SlotKey::new(member_id, pos).encode()[..])?;
    }
    Ok(())
}

fn abort<T>(err: Error) -> ConflictableTransactionResult<T, Error> {
    Err(ConflictableTransactionError::Abort(err))
}

pub(super) fn abort_with(err: Error) -> ConflictableTransactionError<Error> {
    ConflictableTransactionError::Abort(err)
}
