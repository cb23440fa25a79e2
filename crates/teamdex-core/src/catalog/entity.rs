//! Catalog record definitions.

use rkyv::{Archive, Deserialize, Serialize};

use crate::storage::row_codec;

/// Base stats of a creature.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
    /// Sum of the six stats.
    pub total: u16,
}

impl BaseStats {
    /// Build stats, computing the total.
    pub fn new(hp: u16, atk: u16, def: u16, spa: u16, spd: u16, spe: u16) -> Self {
        Self {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
            total: hp + atk + def + spa + spd + spe,
        }
    }
}

/// A creature in the catalog.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct CreatureRow {
    /// National dex number, the id team members reference.
    pub id: u32,
    /// Unique name.
    pub name: String,
    /// Slash-delimited types, e.g. `grass/poison`.
    #[serde(rename = "type")]
    pub types: String,
    /// Slash-delimited legal abilities, e.g. `overgrow/chlorophyll`.
    pub abilities: String,
    /// Base stats, when known.
    #[serde(default)]
    pub stats: Option<BaseStats>,
}

impl CreatureRow {
    /// Create a creature without stats.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        types: impl Into<String>,
        abilities: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            types: types.into(),
            abilities: abilities.into(),
            stats: None,
        }
    }

    /// Attach base stats.
    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Iterate the legal ability names.
    pub fn abilities(&self) -> impl Iterator<Item = &str> {
        self.abilities.split('/').filter(|a| !a.is_empty())
    }

    /// Whether `ability` is one of this creature's abilities.
    pub fn has_ability(&self, ability: &str) -> bool {
        self.abilities().any(|a| a == ability)
    }
}

/// A move in the catalog.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct MoveRow {
    /// Unique name.
    pub name: String,
    /// Elemental type.
    #[serde(rename = "type")]
    pub move_type: String,
    /// Damage class: physical, special or status.
    pub category: String,
    /// Base power; none for status moves.
    #[serde(default)]
    pub power: Option<u32>,
    /// Accuracy percentage; none for moves that never miss.
    #[serde(default)]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub description: String,
}

impl MoveRow {
    /// Create a move with no power, accuracy or description.
    pub fn new(
        name: impl Into<String>,
        move_type: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            move_type: move_type.into(),
            category: category.into(),
            power: None,
            accuracy: None,
            description: String::new(),
        }
    }

    /// Set the base power.
    pub fn with_power(mut self, power: u32) -> Self {
        self.power = Some(power);
        self
    }

    /// Set the accuracy.
    pub fn with_accuracy(mut self, accuracy: u32) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A held item in the catalog.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct ItemRow {
    pub id: u32,
    /// Unique name.
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ItemRow {
    /// Create an item.
    pub fn new(id: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

row_codec!(CreatureRow, MoveRow, ItemRow);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Row;

    #[test]
    fn test_abilities_split_on_slash() {
        let venusaur = CreatureRow::new(3, "venusaur", "grass/poison", "overgrow/chlorophyll");
        let abilities: Vec<&str> = venusaur.abilities().collect();
        assert_eq!(abilities, vec!["overgrow", "chlorophyll"]);
        assert!(venusaur.has_ability("chlorophyll"));
        assert!(!venusaur.has_ability("blaze"));
        assert!(!venusaur.has_ability("over"));
    }

    #[test]
    fn test_stats_total() {
        let stats = BaseStats::new(35, 55, 40, 50, 50, 90);
        assert_eq!(stats.total, 320);
    }

    #[test]
    fn test_creature_roundtrip_with_stats() {
        let pikachu = CreatureRow::new(25, "pikachu", "electric", "static/lightning-rod")
            .with_stats(BaseStats::new(35, 55, 40, 50, 50, 90));
        let bytes = pikachu.to_bytes().unwrap();
        assert_eq!(CreatureRow::from_bytes(&bytes).unwrap(), pikachu);
    }

    #[test]
    fn test_move_json_shape() {
        let json = r#"{"name": "swords-dance", "type": "normal", "category": "status"}"#;
        let mv: MoveRow = serde_json::from_str(json).unwrap();
        assert_eq!(mv, MoveRow::new("swords-dance", "normal", "status"));
        assert!(mv.power.is_none());
    }
}
