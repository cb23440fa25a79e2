//! Storage engine implementation.

use sled::transaction::{ConflictableTransactionResult, TransactionError, TransactionalTree};
use sled::{Db, Transactional, Tree};

use super::key::{decode_id, id_key, SlotKey};
use super::transaction::abort_with;
use super::{MemberRow, Row, RosterTransaction, StorageConfig, TeamRow};
use crate::error::Error;
use crate::roster::{RosterSlot, RosterSnapshot};
use crate::MAX_SLOTS;

/// Tree name for team rows (team id -> [`TeamRow`]).
pub(crate) const TEAM_TREE: &str = "team:rows";

/// Tree name for the unique team name index (name -> team id).
pub(crate) const TEAM_NAME_TREE: &str = "team:names";

/// Tree name for member rows (member id -> [`MemberRow`]).
pub(crate) const MEMBER_TREE: &str = "team:members";

/// Tree name for roster slots (team id + slot -> member id).
pub(crate) const ROSTER_TREE: &str = "team:roster";

/// Tree name for member moves (member id + position -> move name).
pub(crate) const MEMBER_MOVE_TREE: &str = "team:member_moves";

/// The roster storage engine wrapping sled.
pub struct StorageEngine {
    /// The underlying sled database, shared with the catalog.
    db: Db,

    /// Team rows.
    teams: Tree,

    /// Unique name index.
    team_names: Tree,

    /// Member rows.
    members: Tree,

    /// Slot index.
    roster: Tree,

    /// Member move rows.
    member_moves: Tree,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        Self::from_db(db)
    }

    /// Wrap an already opened sled database.
    pub fn from_db(db: Db) -> Result<Self, Error> {
        let teams = db.open_tree(TEAM_TREE)?;
        let team_names = db.open_tree(TEAM_NAME_TREE)?;
        let members = db.open_tree(MEMBER_TREE)?;
        let roster = db.open_tree(ROSTER_TREE)?;
        let member_moves = db.open_tree(MEMBER_MOVE_TREE)?;

        Ok(Self {
            db,
            teams,
            team_names,
            members,
            roster,
            member_moves,
        })
    }

    /// Check if the database was recovered from a previous crash.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Look up a team by its unique name.
    pub fn team_by_name(&self, name: &str) -> Result<Option<TeamRow>, Error> {
        let id = match self.team_names.get(name.as_bytes())? {
            Some(bytes) => decode_id(&bytes).ok_or_else(|| {
                Error::Deserialization(format!("corrupt team id for {name}"))
            })?,
            None => return Ok(None),
        };
        self.team(id)
    }

    /// Look up a team by id.
    pub fn team(&self, id: u64) -> Result<Option<TeamRow>, Error> {
        match self.teams.get(id_key(id))? {
            Some(bytes) => Ok(Some(TeamRow::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All teams, ordered by id.
    pub fn list_teams(&self) -> Result<Vec<TeamRow>, Error> {
        self.teams
            .iter()
            .values()
            .map(|value| TeamRow::from_bytes(&value?))
            .collect()
    }

    /// Read team `name` and its whole roster in one transaction.
    ///
    /// The slots, member rows and moves all belong to the returned team
    /// version; a concurrent commit is either fully visible or not at all.
    pub fn snapshot(&self, name: &str) -> Result<Option<RosterSnapshot>, Error> {
        let trees = (
            &self.team_names,
            &self.teams,
            &self.roster,
            &self.members,
            &self.member_moves,
        );

        let result: Result<Option<RosterSnapshot>, TransactionError<Error>> =
            trees.transaction(|(names, teams, roster, members, moves)| {
                let Some(id) = names.get(name.as_bytes())? else {
                    return Ok(None);
                };
                let id = decode_id(&id).ok_or_else(|| {
                    abort_with(Error::Deserialization(format!("corrupt team id for {name}")))
                })?;
                let Some(bytes) = teams.get(id_key(id))? else {
                    return Ok(None);
                };
                let team = TeamRow::from_bytes(&bytes).map_err(abort_with)?;
                let slots = read_slots(roster, members, moves, team.id)?;

                Ok(Some(RosterSnapshot { team, slots }))
            });

        finish(result)
    }

    /// Load a team's roster ordered by slot.
    pub fn roster(&self, team_id: u64) -> Result<Vec<RosterSlot>, Error> {
        let trees = (&self.roster, &self.members, &self.member_moves);
        let result: Result<Vec<RosterSlot>, TransactionError<Error>> = trees
            .transaction(|(roster, members, moves)| read_slots(roster, members, moves, team_id));
        finish(result)
    }

    /// Look up a member row by id.
    pub fn member(&self, id: u64) -> Result<Option<MemberRow>, Error> {
        match self.members.get(id_key(id))? {
            Some(bytes) => Ok(Some(MemberRow::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Move names of a member, in the order they were supplied.
    pub fn member_moves(&self, member_id: u64) -> Result<Vec<String>, Error> {
        let trees = (&self.members, &self.member_moves);
        let result: Result<Vec<String>, TransactionError<Error>> =
            trees.transaction(|(members, moves)| match members.get(id_key(member_id))? {
                Some(bytes) => {
                    let member = MemberRow::from_bytes(&bytes).map_err(abort_with)?;
                    read_moves(moves, &member)
                }
                None => Ok(Vec::new()),
            });
        finish(result)
    }

    /// Total number of member rows across all teams.
    pub fn member_row_count(&self) -> usize {
        self.members.len()
    }

    /// Total number of member move rows across all teams.
    pub fn member_move_row_count(&self) -> usize {
        self.member_moves.len()
    }

    /// Begin a transaction that creates a new team named `name`.
    pub fn begin_create(&self, name: impl Into<String>) -> RosterTransaction<'_> {
        RosterTransaction::create(self, name.into())
    }

    /// Begin a transaction against an existing team.
    ///
    /// The commit fails if the team's version moved past `team.version`.
    pub fn begin(&self, team: &TeamRow) -> RosterTransaction<'_> {
        RosterTransaction::existing(self, team.clone())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Get the underlying sled database (for opening the catalog).
    pub fn db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn teams_tree(&self) -> &Tree {
        &self.teams
    }

    pub(crate) fn team_names_tree(&self) -> &Tree {
        &self.team_names
    }

    pub(crate) fn members_tree(&self) -> &Tree {
        &self.members
    }

    pub(crate) fn roster_tree(&self) -> &Tree {
        &self.roster
    }

    pub(crate) fn member_moves_tree(&self) -> &Tree {
        &self.member_moves
    }
}

/// Read every occupied slot of `team_id` inside a transaction.
///
/// Transactional trees cannot scan, so each possible slot is a point read.
fn read_slots(
    roster: &TransactionalTree,
    members: &TransactionalTree,
    moves: &TransactionalTree,
    team_id: u64,
) -> ConflictableTransactionResult<Vec<RosterSlot>, Error> {
    let mut slots = Vec::new();

    for index in 0..MAX_SLOTS as u8 {
        let Some(value) = roster.get(SlotKey::new(team_id, index).encode())? else {
            continue;
        };
        let member_id = decode_id(&value).ok_or_else(|| {
            abort_with(Error::Deserialization(format!(
                "corrupt member id for team {team_id}"
            )))
        })?;
        let Some(bytes) = members.get(id_key(member_id))? else {
            return Err(abort_with(Error::Deserialization(format!(
                "roster slot {index} of team {team_id} points at missing member {member_id}"
            ))));
        };
        let member = MemberRow::from_bytes(&bytes).map_err(abort_with)?;
        let names = read_moves(moves, &member)?;

        slots.push(RosterSlot::new(member, names));
    }

    Ok(slots)
}

/// Read the `move_count` move rows of `member` inside a transaction.
fn read_moves(
    moves: &TransactionalTree,
    member: &MemberRow,
) -> ConflictableTransactionResult<Vec<String>, Error> {
    let mut names = Vec::with_capacity(member.move_count.into());

    for pos in 0..member.move_count {
        let Some(value) = moves.get(SlotKey::new(member.id, pos).encode())? else {
            return Err(abort_with(Error::Deserialization(format!(
                "member {} is missing move {pos}",
                member.id
            ))));
        };
        let name = String::from_utf8(value.to_vec())
            .map_err(|e| abort_with(Error::Deserialization(e.to_string())))?;
        names.push(name);
    }

    Ok(names)
}

fn finish<T>(result: Result<T, TransactionError<Error>>) -> Result<T, Error> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RosterOp;

    struct TestDb {
        engine: StorageEngine,
        _dir: tempfile::TempDir, // Keep the temp dir alive
    }

    impl std::ops::Deref for TestDb {
        type Target = StorageEngine;
        fn deref(&self) -> &Self::Target {
            &self.engine
        }
    }

    fn test_engine() -> TestDb {
        let dir = tempfile::tempdir().unwrap();
        let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
        TestDb { engine, _dir: dir }
    }

    #[test]
    fn test_empty_engine() {
        let engine = test_engine();
        assert!(engine.team_by_name("nobody").unwrap().is_none());
        assert!(engine.list_teams().unwrap().is_empty());
        assert!(engine.roster(1).unwrap().is_empty());
        assert_eq!(engine.member_row_count(), 0);
        assert_eq!(engine.member_move_row_count(), 0);
    }

    #[test]
    fn test_create_and_read_back() {
        let engine = test_engine();
        let team = engine.begin_create("Bolt").commit().unwrap();

        assert_eq!(team.version, 1);
        assert_eq!(engine.team_by_name("Bolt").unwrap(), Some(team.clone()));
        assert_eq!(engine.team(team.id).unwrap(), Some(team.clone()));
        assert_eq!(engine.list_teams().unwrap(), vec![team]);
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();

        {
            let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
            engine.begin_create("Kept").commit().unwrap();
            engine.flush().unwrap();
        }

        let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
        let team = engine.team_by_name("Kept").unwrap().unwrap();
        assert_eq!(team.name, "Kept");
    }

    #[test]
    fn test_snapshot_reads_team_and_roster_together() {
        let engine = test_engine();
        assert!(engine.snapshot("Bolt").unwrap().is_none());

        let mut tx = engine.begin_create("Bolt");
        tx.push(RosterOp::Put {
            slot: 0,
            member_id: None,
            creature_id: 25,
            ability: None,
            item_id: None,
            moves: vec!["thunderbolt".into(), "growl".into()],
        });
        let team = tx.commit().unwrap();

        let snapshot = engine.snapshot("Bolt").unwrap().unwrap();
        assert_eq!(snapshot.team, team);
        assert_eq!(snapshot.slots.len(), 1);
        assert_eq!(snapshot.slots[0].moves, vec!["thunderbolt", "growl"]);
        assert_eq!(
            engine.member_moves(snapshot.slots[0].member_id).unwrap(),
            vec!["thunderbolt", "growl"]
        );
    }

    #[test]
    fn test_snapshot_reports_dangling_slot() {
        let engine = test_engine();
        let team = engine.begin_create("Bolt").commit().unwrap();
        engine
            .roster_tree()
            .insert(SlotKey::new(team.id, 0).encode(), &id_key(99)[..])
            .unwrap();

        let err = engine.snapshot("Bolt").unwrap_err();
        assert!(matches!(err, Error::Deserialization(ref msg) if msg.contains("missing member 99")));
    }
}
