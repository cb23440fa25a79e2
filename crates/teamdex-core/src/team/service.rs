//! Team service orchestrating validation, reconciliation and commits.

use tracing::{debug, info};

use super::{MemberView, TeamListing, TeamSummary, TeamView};
use crate::catalog::CatalogLookup;
use crate::constraint::{MemberSpec, MemberValidator};
use crate::error::{EntityKind, Error, Limit, Result};
use crate::roster::{reconcile, Plan, RosterSlot, RosterSnapshot};
use crate::storage::{StorageEngine, TeamRow};
use crate::{MAX_MOVES, MAX_SLOTS};

/// Create, update, delete and read teams.
///
/// Every mutation validates the whole requested roster before anything is
/// written, then commits one [`RosterTransaction`](crate::storage::RosterTransaction).
pub struct TeamService<'a, C: CatalogLookup + ?Sized> {
    engine: &'a StorageEngine,
    catalog: &'a C,
}

impl<'a, C: CatalogLookup + ?Sized> TeamService<'a, C> {
    /// Create a service over a storage engine and a catalog.
    pub fn new(engine: &'a StorageEngine, catalog: &'a C) -> Self {
        Self { engine, catalog }
    }

    /// Create a team named `name` with `members` in slot order.
    pub fn create_team(&self, name: &str, members: Vec<MemberSpec>) -> Result<TeamSummary> {
        check_name(name)?;
        check_shape(&members)?;

        if self.engine.team_by_name(name)?.is_some() {
            return Err(Error::Conflict {
                team: name.to_string(),
            });
        }

        let validated = MemberValidator::new(self.catalog).validate_all(&members)?;
        let plan = reconcile(&[], validated);
        debug!(team = name, plan = ?plan.summary(), "planned new team");

        let mut tx = self.engine.begin_create(name);
        tx.apply(&plan);
        let team = tx.commit()?;

        info!(
            team = %team.name,
            team_id = team.id,
            version = team.version,
            "team created: {}",
            plan.summary()
        );
        Ok(summary(&team, &plan))
    }

    /// Replace the roster of team `name` with `members`.
    ///
    /// Members are matched to stored slots by position. A missing team is
    /// reported before any limit or catalog check. Fails with
    /// [`Error::TransactionFailure`] if the team changed after it was read.
    pub fn update_team(&self, name: &str, members: Vec<MemberSpec>) -> Result<TeamSummary> {
        let snapshot = self.require_team(name)?;
        check_shape(&members)?;

        let validated = MemberValidator::new(self.catalog).validate_all(&members)?;
        let plan = reconcile(&snapshot.slots, validated);
        debug!(
            team = name,
            version = snapshot.team.version,
            plan = ?plan.summary(),
            "planned update"
        );

        let mut tx = self.engine.begin(&snapshot.team);
        tx.apply(&plan);
        let team = tx.commit()?;

        info!(
            team = %team.name,
            team_id = team.id,
            version = team.version,
            "team updated: {}",
            plan.summary()
        );
        Ok(summary(&team, &plan))
    }

    /// Delete team `name` and every member it holds.
    pub fn delete_team(&self, name: &str) -> Result<()> {
        let snapshot = self.require_team(name)?;
        let plan = reconcile(&snapshot.slots, Vec::new());

        let mut tx = self.engine.begin(&snapshot.team);
        tx.apply(&plan).delete_team();
        let team = tx.commit()?;

        info!(
            team = %team.name,
            team_id = team.id,
            "team deleted: {}",
            plan.summary()
        );
        Ok(())
    }

    /// Team `name` with its members ordered by slot.
    pub fn get_team(&self, name: &str) -> Result<TeamView> {
        let RosterSnapshot { team, slots } = self.require_team(name)?;
        let members = slots
            .iter()
            .map(|slot| self.member_view(slot))
            .collect::<Result<Vec<_>>>()?;

        Ok(TeamView {
            id: team.id,
            name: team.name,
            version: team.version,
            members,
        })
    }

    /// Every team, ordered by id.
    pub fn list_teams(&self) -> Result<Vec<TeamListing>> {
        Ok(self
            .engine
            .list_teams()?
            .into_iter()
            .map(|team| TeamListing {
                team_id: team.id,
                team_name: team.name,
            })
            .collect())
    }

    /// The first member of team `team` whose creature is `creature`.
    pub fn get_member(&self, team: &str, creature: &str) -> Result<MemberView> {
        self.get_team(team)?
            .members
            .into_iter()
            .find(|member| member.creature_name == creature)
            .ok_or_else(|| Error::not_found(EntityKind::TeamMember, creature))
    }

    fn require_team(&self, name: &str) -> Result<RosterSnapshot> {
        self.engine
            .snapshot(name)?
            .ok_or_else(|| Error::not_found(EntityKind::Team, name))
    }

    fn member_view(&self, slot: &RosterSlot) -> Result<MemberView> {
        let creature_id = slot.member.creature_id;
        let creature = self
            .catalog
            .creature_by_id(creature_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Creature, format!("#{creature_id}")))?;

        let item_name = match slot.member.item_id {
            Some(id) => Some(
                self.catalog
                    .item_by_id(id)?
                    .ok_or_else(|| Error::not_found(EntityKind::Item, format!("#{id}")))?
                    .name,
            ),
            None => None,
        };

        Ok(MemberView {
            slot_id: slot.member_id,
            slot: slot.slot,
            creature_name: creature.name,
            ability: slot.member.ability.clone(),
            item_name,
            move_names: slot.moves.clone(),
        })
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("team name must not be empty".into()));
    }
    Ok(())
}

fn check_shape(members: &[MemberSpec]) -> Result<()> {
    if members.len() > MAX_SLOTS {
        return Err(Error::StructuralLimit {
            limit: Limit::RosterSlots,
            requested: members.len(),
        });
    }
    if let Some(count) = members
        .iter()
        .map(|member| member.moves().count())
        .find(|&count| count > MAX_MOVES)
    {
        return Err(Error::StructuralLimit {
            limit: Limit::Moveset,
            requested: count,
        });
    }
    Ok(())
}

fn summary(team: &TeamRow, plan: &Plan) -> TeamSummary {
    TeamSummary {
        team_id: team.id,
        team_name: team.name.clone(),
        version: team.version,
        members: plan.roster_len(),
    }
}
