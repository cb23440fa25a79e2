//! Catalog manager backed by sled trees.

use std::collections::HashSet;

use sled::{Db, Tree};
use tracing::debug;

use super::{BaseStats, CatalogLookup, CreatureRow, ItemRow, MoveQuery, MoveRow};
use crate::error::{EntityKind, Error, Result};
use crate::storage::key::{id_key, link_key, link_move, link_prefix};
use crate::storage::Row;

/// Tree name for creatures (name -> [`CreatureRow`]).
const CREATURE_TREE: &str = "catalog:creatures";

/// Tree name for the creature id index (id -> name).
const CREATURE_ID_TREE: &str = "catalog:creature_ids";

/// Tree name for moves (name -> [`MoveRow`]).
const MOVE_TREE: &str = "catalog:moves";

/// Tree name for items (name -> [`ItemRow`]).
const ITEM_TREE: &str = "catalog:items";

/// Tree name for the item id index (id -> name).
const ITEM_ID_TREE: &str = "catalog:item_ids";

/// Tree name for creature/move legality links (creature \0 move -> empty).
const LINK_TREE: &str = "catalog:links";

/// The creature, move and item catalog.
pub struct Catalog {
    creatures: Tree,
    creature_ids: Tree,
    moves: Tree,
    items: Tree,
    item_ids: Tree,
    links: Tree,
}

impl Catalog {
    /// Open or create a catalog using the given sled database.
    pub fn open(db: &Db) -> Result<Self> {
        Ok(Self {
            creatures: db.open_tree(CREATURE_TREE)?,
            creature_ids: db.open_tree(CREATURE_ID_TREE)?,
            moves: db.open_tree(MOVE_TREE)?,
            items: db.open_tree(ITEM_TREE)?,
            item_ids: db.open_tree(ITEM_ID_TREE)?,
            links: db.open_tree(LINK_TREE)?,
        })
    }

    /// Insert or replace a creature.
    ///
    /// Fails with [`Error::InvalidInput`] if the id already names another
    /// creature.
    pub fn register_creature(&self, creature: &CreatureRow) -> Result<()> {
        Self::check_id_owner(&self.creature_ids, "creature", creature.id, &creature.name)?;
        if let Some(previous) = self.find_creature(&creature.name)? {
            if previous.id != creature.id {
                self.creature_ids.remove(id_key(previous.id.into()))?;
            }
        }
        self.creatures
            .insert(creature.name.as_bytes(), creature.to_bytes()?)?;
        self.creature_ids
            .insert(id_key(creature.id.into()), creature.name.as_bytes())?;
        Ok(())
    }

    /// Insert or replace a move.
    pub fn register_move(&self, mv: &MoveRow) -> Result<()> {
        self.moves.insert(mv.name.as_bytes(), mv.to_bytes()?)?;
        Ok(())
    }

    /// Insert or replace an item.
    ///
    /// Fails with [`Error::InvalidInput`] if the id already names another item.
    pub fn register_item(&self, item: &ItemRow) -> Result<()> {
        Self::check_id_owner(&self.item_ids, "item", item.id, &item.name)?;
        if let Some(previous) = self.find_item(&item.name)? {
            if previous.id != item.id {
                self.item_ids.remove(id_key(previous.id.into()))?;
            }
        }
        self.items.insert(item.name.as_bytes(), item.to_bytes()?)?;
        self.item_ids
            .insert(id_key(item.id.into()), item.name.as_bytes())?;
        Ok(())
    }

    /// Mark `mv` as learnable by `creature`. Both must already exist.
    pub fn link(&self, creature: &str, mv: &str) -> Result<()> {
        if !self.creatures.contains_key(creature.as_bytes())? {
            return Err(Error::InvalidInput(format!(
                "cannot link unknown creature {creature}"
            )));
        }
        if !self.moves.contains_key(mv.as_bytes())? {
            return Err(Error::InvalidInput(format!("cannot link unknown move {mv}")));
        }
        self.links.insert(link_key(creature, mv), Vec::<u8>::new())?;
        Ok(())
    }

    /// Number of creatures in the catalog.
    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    /// Number of moves in the catalog.
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Number of items in the catalog.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of creature/move links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Moves a creature can learn, sorted by name.
    ///
    /// With `filter`, only the move of that name is returned. A filter that
    /// matches nothing, or a creature with no learnable moves, is a not-found
    /// error for the move.
    pub fn creature_moves(&self, creature: &str, filter: Option<&str>) -> Result<Vec<MoveRow>> {
        if !self.creatures.contains_key(creature.as_bytes())? {
            return Err(Error::not_found(EntityKind::Creature, creature));
        }

        let mut names: Vec<String> = self.legal_moves(creature)?.into_iter().collect();
        if let Some(wanted) = filter {
            names.retain(|name| name == wanted);
        }
        names.sort();

        let mut moves = Vec::with_capacity(names.len());
        for name in &names {
            if let Some(mv) = self.find_move(name)? {
                moves.push(mv);
            }
        }

        match filter {
            _ if !moves.is_empty() => Ok(moves),
            Some(wanted) => Err(Error::not_found(EntityKind::Move, wanted)),
            None => Err(Error::not_found(
                EntityKind::Move,
                format!("moves of {creature}"),
            )),
        }
    }

    /// Base stats of a creature.
    pub fn creature_stats(&self, creature: &str) -> Result<BaseStats> {
        let row = self
            .find_creature(creature)?
            .ok_or_else(|| Error::not_found(EntityKind::Creature, creature))?;
        row.stats
            .ok_or_else(|| Error::not_found(EntityKind::Stats, creature))
    }

    /// Moves matching `query`, sorted by name and paged.
    pub fn search_moves(&self, query: &MoveQuery) -> Result<Vec<MoveRow>> {
        query.validate()?;

        let mut page = Vec::new();
        let mut skipped = 0;
        // Keys are move names, so tree order is name order.
        for value in self.moves.iter().values() {
            if page.len() == query.limit {
                break;
            }
            let mv = MoveRow::from_bytes(&value?)?;
            if !query.matches(&mv) {
                continue;
            }
            if skipped < query.offset {
                skipped += 1;
                continue;
            }
            page.push(mv);
        }

        debug!(matched = page.len(), offset = query.offset, "move search");
        Ok(page)
    }

    fn check_id_owner(tree: &Tree, kind: &str, id: u32, name: &str) -> Result<()> {
        match Self::name_by_id(tree, id)? {
            Some(owner) if owner != name => Err(Error::InvalidInput(format!(
                "{kind} id {id} already belongs to {owner}"
            ))),
            _ => Ok(()),
        }
    }

    fn name_by_id(tree: &Tree, id: u32) -> Result<Option<String>> {
        match tree.get(id_key(id.into()))? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| Error::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn get_row<T: Row>(tree: &Tree, name: &str) -> Result<Option<T>> {
        match tree.get(name.as_bytes())? {
            Some(bytes) => Ok(Some(T::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl CatalogLookup for Catalog {
    fn find_creature(&self, name: &str) -> Result<Option<CreatureRow>> {
        Self::get_row(&self.creatures, name)
    }

    fn find_move(&self, name: &str) -> Result<Option<MoveRow>> {
        Self::get_row(&self.moves, name)
    }

    fn find_item(&self, name: &str) -> Result<Option<ItemRow>> {
        Self::get_row(&self.items, name)
    }

    fn legal_moves(&self, creature: &str) -> Result<HashSet<String>> {
        let prefix = link_prefix(creature);
        let mut moves = HashSet::new();
        for key in self.links.scan_prefix(&prefix).keys() {
            let key = key?;
            let mv = link_move(&key, prefix.len())
                .ok_or_else(|| Error::Deserialization(format!("corrupt link for {creature}")))?;
            moves.insert(mv);
        }
        Ok(moves)
    }

    fn creature_by_id(&self, id: u32) -> Result<Option<CreatureRow>> {
        match Self::name_by_id(&self.creature_ids, id)? {
            Some(name) => self.find_creature(&name),
            None => Ok(None),
        }
    }

    fn item_by_id(&self, id: u32) -> Result<Option<ItemRow>> {
        match Self::name_by_id(&self.item_ids, id)? {
            Some(name) => self.find_item(&name),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_catalog() -> (Catalog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let catalog = Catalog::open(&db).unwrap();

        catalog
            .register_creature(
                &CreatureRow::new(25, "pikachu", "electric", "static/lightning-rod")
                    .with_stats(BaseStats::new(35, 55, 40, 50, 50, 90)),
            )
            .unwrap();
        catalog
            .register_creature(&CreatureRow::new(132, "ditto", "normal", "limber/imposter"))
            .unwrap();
        for mv in [
            MoveRow::new("thunderbolt", "electric", "special")
                .with_power(90)
                .with_accuracy(100),
            MoveRow::new("quick-attack", "normal", "physical")
                .with_power(40)
                .with_accuracy(100),
            MoveRow::new("growl", "normal", "status").with_accuracy(100),
            MoveRow::new("transform", "normal", "status"),
        ] {
            catalog.register_move(&mv).unwrap();
        }
        catalog
            .register_item(&ItemRow::new(1, "light-ball", "Doubles attack."))
            .unwrap();
        for mv in ["thunderbolt", "quick-attack", "growl"] {
            catalog.link("pikachu", mv).unwrap();
        }
        catalog.link("ditto", "transform").unwrap();

        (catalog, dir)
    }

    #[test]
    fn test_lookups() {
        let (catalog, _dir) = test_catalog();

        assert_eq!(catalog.find_creature("pikachu").unwrap().unwrap().id, 25);
        assert!(catalog.find_creature("mew").unwrap().is_none());
        assert_eq!(catalog.creature_by_id(132).unwrap().unwrap().name, "ditto");
        assert_eq!(catalog.item_by_id(1).unwrap().unwrap().name, "light-ball");
        assert!(catalog.item_by_id(2).unwrap().is_none());
        assert_eq!(catalog.link_count(), 4);
    }

    #[test]
    fn test_legal_moves_do_not_leak_across_creatures() {
        let (catalog, _dir) = test_catalog();

        let legal = catalog.legal_moves("pikachu").unwrap();
        assert_eq!(legal.len(), 3);
        assert!(!legal.contains("transform"));
        assert!(catalog.legal_moves("mew").unwrap().is_empty());
    }

    #[test]
    fn test_link_requires_known_entities() {
        let (catalog, _dir) = test_catalog();

        assert!(matches!(
            catalog.link("mew", "growl"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.link("pikachu", "surf"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_creature_moves_sorted_and_filtered() {
        let (catalog, _dir) = test_catalog();

        let names: Vec<String> = catalog
            .creature_moves("pikachu", None)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["growl", "quick-attack", "thunderbolt"]);

        let filtered = catalog.creature_moves("pikachu", Some("growl")).unwrap();
        assert_eq!(filtered.len(), 1);

        assert!(matches!(
            catalog.creature_moves("pikachu", Some("transform")),
            Err(Error::NotFound {
                kind: EntityKind::Move,
                ..
            })
        ));
        assert!(matches!(
            catalog.creature_moves("mew", None),
            Err(Error::NotFound {
                kind: EntityKind::Creature,
                ..
            })
        ));
    }

    #[test]
    fn test_creature_stats() {
        let (catalog, _dir) = test_catalog();

        assert_eq!(catalog.creature_stats("pikachu").unwrap().spe, 90);
        assert!(matches!(
            catalog.creature_stats("ditto"),
            Err(Error::NotFound {
                kind: EntityKind::Stats,
                ..
            })
        ));
    }

    #[test]
    fn test_search_moves() {
        let (catalog, _dir) = test_catalog();

        let normal = catalog
            .search_moves(&MoveQuery::new().with_type("normal"))
            .unwrap();
        let names: Vec<&str> = normal.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["growl", "quick-attack", "transform"]);

        let strong = catalog
            .search_moves(&MoveQuery::new().with_power(Some(50), None))
            .unwrap();
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].name, "thunderbolt");

        let page = catalog
            .search_moves(&MoveQuery::new().with_type("normal").with_page(1, 1))
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "quick-attack");
    }

    #[test]
    fn test_reregister_creature_moves_id_index() {
        let (catalog, _dir) = test_catalog();

        catalog
            .register_creature(&CreatureRow::new(26, "pikachu", "electric", "static"))
            .unwrap();
        assert!(catalog.creature_by_id(25).unwrap().is_none());
        assert_eq!(catalog.creature_by_id(26).unwrap().unwrap().name, "pikachu");
    }

    #[test]
    fn test_register_rejects_id_of_another_name() {
        let (catalog, _dir) = test_catalog();

        let err = catalog
            .register_creature(&CreatureRow::new(25, "raichu", "electric", "static"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("pikachu")));
        assert_eq!(catalog.creature_by_id(25).unwrap().unwrap().name, "pikachu");
        assert!(catalog.find_creature("raichu").unwrap().is_none());

        let err = catalog
            .register_item(&ItemRow::new(1, "leftovers", "Restores HP."))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(catalog.item_by_id(1).unwrap().unwrap().name, "light-ball");
        assert!(catalog.find_item("leftovers").unwrap().is_none());

        // Re-registering under the same name is still an overwrite.
        catalog
            .register_item(&ItemRow::new(1, "light-ball", "Boosts pikachu."))
            .unwrap();
        assert_eq!(catalog.item_count(), 1);
    }

    #[test]
    fn test_creature_without_moves_is_not_found() {
        let (catalog, _dir) = test_catalog();
        catalog
            .register_creature(&CreatureRow::new(129, "magikarp", "water", "swift-swim"))
            .unwrap();

        assert!(matches!(
            catalog.creature_moves("magikarp", None),
            Err(Error::NotFound {
                kind: EntityKind::Move,
                ..
            })
        ));
    }
}
