//! Integration tests for team lifecycle and roster reconciliation.

use teamdex_core::catalog::{BaseStats, Catalog, CreatureRow, ItemRow, MoveRow};
use teamdex_core::error::{EntityKind, Error, ErrorCategory, Limit};
use teamdex_core::storage::{StorageConfig, StorageEngine};
use teamdex_core::{MemberSpec, TeamService, MAX_SLOTS};

struct TestContext {
    engine: StorageEngine,
    catalog: Catalog,
    _dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
        let catalog = Catalog::open(engine.db()).unwrap();
        seed_catalog(&catalog);

        Self {
            engine,
            catalog,
            _dir: dir,
        }
    }

    fn service(&self) -> TeamService<'_, Catalog> {
        TeamService::new(&self.engine, &self.catalog)
    }
}

fn seed_catalog(catalog: &Catalog) {
    for creature in [
        CreatureRow::new(25, "pikachu", "electric", "static/lightning-rod")
            .with_stats(BaseStats::new(35, 55, 40, 50, 50, 90)),
        CreatureRow::new(1, "bulbasaur", "grass/poison", "overgrow/chlorophyll"),
        CreatureRow::new(4, "charmander", "fire", "blaze/solar-power"),
        CreatureRow::new(7, "squirtle", "water", "torrent/rain-dish"),
    ] {
        catalog.register_creature(&creature).unwrap();
    }
    for mv in [
        MoveRow::new("thunderbolt", "electric", "special").with_power(90),
        MoveRow::new("quick-attack", "normal", "physical").with_power(40),
        MoveRow::new("growl", "normal", "status"),
        MoveRow::new("tail-whip", "normal", "status"),
        MoveRow::new("thunder-wave", "electric", "status"),
        MoveRow::new("vine-whip", "grass", "physical").with_power(45),
        MoveRow::new("ember", "fire", "special").with_power(40),
        MoveRow::new("water-gun", "water", "special").with_power(40),
    ] {
        catalog.register_move(&mv).unwrap();
    }
    catalog
        .register_item(&ItemRow::new(1, "light-ball", "Doubles attack."))
        .unwrap();
    catalog
        .register_item(&ItemRow::new(2, "leftovers", "Restores HP."))
        .unwrap();

    for mv in ["thunderbolt", "quick-attack", "growl", "tail-whip", "thunder-wave"] {
        catalog.link("pikachu", mv).unwrap();
    }
    for (creature, mv) in [
        ("bulbasaur", "vine-whip"),
        ("bulbasaur", "growl"),
        ("charmander", "ember"),
        ("charmander", "growl"),
        ("squirtle", "water-gun"),
        ("squirtle", "tail-whip"),
    ] {
        catalog.link(creature, mv).unwrap();
    }
}

fn bolt_pikachu() -> MemberSpec {
    MemberSpec::new("pikachu")
        .with_ability("static")
        .with_item("light-ball")
        .with_moves(["thunderbolt", "quick-attack"])
}

fn starters() -> Vec<MemberSpec> {
    vec![
        MemberSpec::new("bulbasaur").with_moves(["vine-whip"]),
        MemberSpec::new("charmander").with_ability("blaze").with_moves(["ember"]),
        MemberSpec::new("squirtle").with_moves(["water-gun", "tail-whip"]),
    ]
}

#[test]
fn test_bolt_example() {
    let ctx = TestContext::new();
    let service = ctx.service();

    let created = service.create_team("Bolt", vec![bolt_pikachu()]).unwrap();
    assert_eq!(created.members, 1);

    let before = service.get_team("Bolt").unwrap();
    assert_eq!(before.members.len(), 1);
    let member = &before.members[0];
    assert_eq!(member.creature_name, "pikachu");
    assert_eq!(member.ability.as_deref(), Some("static"));
    assert_eq!(member.item_name.as_deref(), Some("light-ball"));
    assert_eq!(member.move_names, vec!["thunderbolt", "quick-attack"]);

    service
        .update_team(
            "Bolt",
            vec![MemberSpec::new("pikachu")
                .with_ability("static")
                .with_item("light-ball")
                .with_moves(["thunderbolt"])],
        )
        .unwrap();

    let after = service.get_team("Bolt").unwrap();
    assert_eq!(after.members[0].slot_id, member.slot_id);
    assert_eq!(after.members[0].move_names, vec!["thunderbolt"]);
    assert_eq!(ctx.engine.member_move_row_count(), 1);
    assert_eq!(after.version, before.version + 1);
}

#[test]
fn test_illegal_ability_writes_nothing() {
    let ctx = TestContext::new();
    let service = ctx.service();

    let err = service
        .create_team("X", vec![MemberSpec::new("bulbasaur").with_ability("blaze")])
        .unwrap_err();

    assert!(matches!(err, Error::IllegalAbility { .. }));
    assert_eq!(err.category(), ErrorCategory::Invalid);
    assert!(ctx.engine.team_by_name("X").unwrap().is_none());
    assert!(service.list_teams().unwrap().is_empty());
    assert_eq!(ctx.engine.member_row_count(), 0);
}

#[test]
fn test_illegal_move_on_update_writes_nothing() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Bolt", vec![bolt_pikachu()]).unwrap();
    let before = service.get_team("Bolt").unwrap();

    let err = service
        .update_team(
            "Bolt",
            vec![
                MemberSpec::new("pikachu").with_moves(["growl"]),
                MemberSpec::new("bulbasaur").with_moves(["ember"]),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, Error::IllegalMove { ref mv, .. } if mv == "ember"));
    assert_eq!(service.get_team("Bolt").unwrap(), before);
}

#[test]
fn test_round_trip_preserves_order() {
    let ctx = TestContext::new();
    let service = ctx.service();

    service.create_team("Kanto", starters()).unwrap();
    let team = service.get_team("Kanto").unwrap();

    let names: Vec<&str> = team
        .members
        .iter()
        .map(|m| m.creature_name.as_str())
        .collect();
    assert_eq!(names, vec!["bulbasaur", "charmander", "squirtle"]);
    let slots: Vec<u8> = team.members.iter().map(|m| m.slot).collect();
    assert_eq!(slots, vec![0, 1, 2]);
    assert_eq!(team.members[2].move_names, vec!["water-gun", "tail-whip"]);
}

#[test]
fn test_update_is_idempotent() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();

    service.update_team("Kanto", starters()).unwrap();
    let first = service.get_team("Kanto").unwrap();
    service.update_team("Kanto", starters()).unwrap();
    let second = service.get_team("Kanto").unwrap();

    assert_eq!(first.members, second.members);
    assert_eq!(ctx.engine.member_row_count(), 3);
    assert_eq!(ctx.engine.member_move_row_count(), 4);
}

#[test]
fn test_shrink_retires_tail_members() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();
    let before = service.get_team("Kanto").unwrap();

    let summary = service
        .update_team("Kanto", starters().into_iter().take(1).collect())
        .unwrap();

    assert_eq!(summary.members, 1);
    let after = service.get_team("Kanto").unwrap();
    assert_eq!(after.members.len(), 1);
    assert_eq!(after.members[0].slot_id, before.members[0].slot_id);
    assert_eq!(ctx.engine.member_row_count(), 1);
    // Only bulbasaur's vine-whip is left.
    assert_eq!(ctx.engine.member_move_row_count(), 1);
}

#[test]
fn test_grow_creates_tail_members() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service
        .create_team("Kanto", starters().into_iter().take(1).collect())
        .unwrap();
    let before = service.get_team("Kanto").unwrap();

    service.update_team("Kanto", starters()).unwrap();

    let after = service.get_team("Kanto").unwrap();
    assert_eq!(after.members.len(), 3);
    assert_eq!(after.members[0].slot_id, before.members[0].slot_id);
    assert_eq!(ctx.engine.member_row_count(), 3);
}

#[test]
fn test_slot_matching_ignores_creature() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();
    let before = service.get_team("Kanto").unwrap();

    let mut reversed = starters();
    reversed.reverse();
    service.update_team("Kanto", reversed).unwrap();

    let after = service.get_team("Kanto").unwrap();
    assert_eq!(after.members[0].creature_name, "squirtle");
    assert_eq!(after.members[0].slot_id, before.members[0].slot_id);
    assert_eq!(after.members[2].creature_name, "bulbasaur");
    assert_eq!(after.members[2].slot_id, before.members[2].slot_id);
}

#[test]
fn test_update_to_empty_roster() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();

    service.update_team("Kanto", Vec::new()).unwrap();

    assert!(service.get_team("Kanto").unwrap().members.is_empty());
    assert_eq!(ctx.engine.member_row_count(), 0);
    assert_eq!(ctx.engine.member_move_row_count(), 0);
}

#[test]
fn test_duplicate_name_conflicts() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Bolt", vec![bolt_pikachu()]).unwrap();

    let err = service.create_team("Bolt", Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Conflict { ref team } if team == "Bolt"));
    assert_eq!(service.list_teams().unwrap().len(), 1);
}

#[test]
fn test_missing_team() {
    let ctx = TestContext::new();
    let service = ctx.service();

    for err in [
        service.update_team("Nope", Vec::new()).unwrap_err(),
        // Existence is checked before roster limits and catalog lookups.
        service
            .update_team("Nope", vec![MemberSpec::new("pikachu"); 7])
            .unwrap_err(),
        service
            .update_team("Nope", vec![MemberSpec::new("missingno")])
            .unwrap_err(),
        service.delete_team("Nope").unwrap_err(),
        service.get_team("Nope").unwrap_err(),
    ] {
        assert!(matches!(
            err,
            Error::NotFound {
                kind: EntityKind::Team,
                ..
            }
        ));
    }
}

#[test]
fn test_delete_team_removes_everything() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();
    service.create_team("Bolt", vec![bolt_pikachu()]).unwrap();

    service.delete_team("Kanto").unwrap();

    assert!(service.get_team("Kanto").is_err());
    let teams = service.list_teams().unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].team_name, "Bolt");
    assert_eq!(ctx.engine.member_row_count(), 1);
    assert_eq!(ctx.engine.member_move_row_count(), 2);

    // The name is free again.
    service.create_team("Kanto", Vec::new()).unwrap();
}

#[test]
fn test_get_member() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Kanto", starters()).unwrap();

    let member = service.get_member("Kanto", "charmander").unwrap();
    assert_eq!(member.slot, 1);
    assert_eq!(member.ability.as_deref(), Some("blaze"));

    let err = service.get_member("Kanto", "pikachu").unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            kind: EntityKind::TeamMember,
            ..
        }
    ));
}

#[test]
fn test_structural_limits() {
    let ctx = TestContext::new();
    let service = ctx.service();

    let seven = vec![MemberSpec::new("pikachu"); 7];
    let err = service.create_team("Big", seven).unwrap_err();
    assert!(matches!(
        err,
        Error::StructuralLimit {
            limit: Limit::RosterSlots,
            requested: 7
        }
    ));

    let five_moves = vec![MemberSpec::new("pikachu").with_moves([
        "thunderbolt",
        "quick-attack",
        "growl",
        "tail-whip",
        "thunder-wave",
    ])];
    let err = service.create_team("Big", five_moves).unwrap_err();
    assert!(matches!(
        err,
        Error::StructuralLimit {
            limit: Limit::Moveset,
            requested: 5
        }
    ));
    assert!(service.list_teams().unwrap().is_empty());
}

#[test]
fn test_duplicate_move_rejected() {
    let ctx = TestContext::new();
    let service = ctx.service();

    let err = service
        .create_team(
            "Twice",
            vec![MemberSpec::new("pikachu").with_moves(["growl", "growl"])],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateMove { .. }));
}

#[test]
fn test_stale_version_is_rejected() {
    let ctx = TestContext::new();
    let service = ctx.service();
    service.create_team("Bolt", vec![bolt_pikachu()]).unwrap();

    let stale = ctx.engine.team_by_name("Bolt").unwrap().unwrap();
    service.update_team("Bolt", vec![bolt_pikachu()]).unwrap();

    let mut tx = ctx.engine.begin(&stale);
    tx.delete_team();
    let err = tx.commit().unwrap_err();

    assert!(matches!(err, Error::TransactionFailure(_)));
    assert!(err.is_retryable());
    assert!(service.get_team("Bolt").is_ok());
}

#[test]
fn test_empty_team_name_rejected() {
    let ctx = TestContext::new();
    let err = ctx.service().create_team("", Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

const CYCLE_MOVES: [&str; 4] = ["thunderbolt", "quick-attack", "growl", "tail-whip"];

/// Moves per member for a roster of `size` pikachus, so a reader can tell
/// which write produced what it saw.
fn moves_for(size: usize) -> usize {
    (size - 1) % CYCLE_MOVES.len() + 1
}

fn pikachus(size: usize) -> Vec<MemberSpec> {
    let moves = &CYCLE_MOVES[..moves_for(size)];
    vec![MemberSpec::new("pikachu").with_moves(moves.iter().copied()); size]
}

#[test]
fn test_reads_during_concurrent_updates_are_consistent() {
    let ctx = TestContext::new();
    ctx.service().create_team("Bolt", pikachus(1)).unwrap();

    std::thread::scope(|scope| {
        for writer in 0..4 {
            let ctx = &ctx;
            scope.spawn(move || {
                let service = ctx.service();
                for round in 0..25 {
                    let size = (writer + round) % MAX_SLOTS + 1;
                    match service.update_team("Bolt", pikachus(size)) {
                        Ok(summary) => assert_eq!(summary.members, size),
                        Err(err) => assert!(err.is_retryable(), "unexpected error: {err}"),
                    }
                }
            });
        }

        for _ in 0..4 {
            let ctx = &ctx;
            scope.spawn(move || {
                let service = ctx.service();
                for _ in 0..100 {
                    let team = service.get_team("Bolt").unwrap();
                    let size = team.members.len();
                    assert!((1..=MAX_SLOTS).contains(&size));
                    for (index, member) in team.members.iter().enumerate() {
                        assert_eq!(usize::from(member.slot), index);
                        assert_eq!(member.move_names.len(), moves_for(size));
                    }
                }
            });
        }
    });

    let team = ctx.service().get_team("Bolt").unwrap();
    let size = team.members.len();
    assert_eq!(ctx.engine.member_row_count(), size);
    assert_eq!(ctx.engine.member_move_row_count(), size * moves_for(size));
}
