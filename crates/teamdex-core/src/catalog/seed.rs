//! JSON catalog seed files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{Catalog, CreatureRow, ItemRow, MoveRow};
use crate::error::{Error, Result};

/// A creature/move legality pair in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkSeed {
    pub creature: String,
    #[serde(rename = "move")]
    pub mv: String,
}

/// Contents of a catalog seed file.
///
/// ```json
/// {
///   "creatures": [{"id": 25, "name": "pikachu", "type": "electric", "abilities": "static"}],
///   "moves": [{"name": "thunderbolt", "type": "electric", "category": "special", "power": 90}],
///   "items": [{"id": 1, "name": "light-ball"}],
///   "links": [{"creature": "pikachu", "move": "thunderbolt"}]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub creatures: Vec<CreatureRow>,
    pub moves: Vec<MoveRow>,
    pub items: Vec<ItemRow>,
    pub links: Vec<LinkSeed>,
}

/// Row counts written by [`Catalog::load_seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub creatures: usize,
    pub moves: usize,
    pub items: usize,
    pub links: usize,
}

impl CatalogSeed {
    /// Parse a seed from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(format!("invalid seed: {e}")))
    }

    /// Read and parse a seed file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::InvalidInput(format!("cannot open seed {}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::InvalidInput(format!("invalid seed {}: {e}", path.display()))
        })
    }
}

impl Catalog {
    /// Register everything in `seed`.
    ///
    /// Entities are written before links, so a link may name any creature or
    /// move in the same seed. A link to an unknown entity aborts the load;
    /// rows written before it stay.
    pub fn load_seed(&self, seed: &CatalogSeed) -> Result<SeedSummary> {
        for creature in &seed.creatures {
            self.register_creature(creature)?;
        }
        for mv in &seed.moves {
            self.register_move(mv)?;
        }
        for item in &seed.items {
            self.register_item(item)?;
        }
        for link in &seed.links {
            self.link(&link.creature, &link.mv)?;
        }

        let summary = SeedSummary {
            creatures: seed.creatures.len(),
            moves: seed.moves.len(),
            items: seed.items.len(),
            links: seed.links.len(),
        };
        info!(
            creatures = summary.creatures,
            moves = summary.moves,
            items = summary.items,
            links = summary.links,
            "catalog seeded"
        );
        Ok(summary)
    }
}
