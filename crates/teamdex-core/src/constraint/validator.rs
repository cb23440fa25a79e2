//! Member validation against the catalog.
//!
//! Checks run in a fixed order: creature, ability, moves, item. The first
//! failure is returned and nothing after it is looked at.

use std::collections::HashSet;

use tracing::debug;

use super::{ItemRef, MemberSpec, ValidatedMember};
use crate::catalog::CatalogLookup;
use crate::error::{EntityKind, Error, Result};

/// Validates [`MemberSpec`]s against a catalog. Has no side effects.
pub struct MemberValidator<'a, C: CatalogLookup + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: CatalogLookup + ?Sized> MemberValidator<'a, C> {
    /// Create a validator reading from `catalog`.
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Validate one member.
    pub fn validate(&self, spec: &MemberSpec) -> Result<ValidatedMember> {
        let creature = self
            .catalog
            .find_creature(&spec.creature)?
            .ok_or_else(|| Error::not_found(EntityKind::Creature, &spec.creature))?;

        let ability = match spec.ability() {
            Some(ability) if !creature.has_ability(ability) => {
                return Err(Error::IllegalAbility {
                    creature: creature.name,
                    ability: ability.to_string(),
                });
            }
            other => other.map(str::to_string),
        };

        let legal = self.catalog.legal_moves(&creature.name)?;
        let mut seen = HashSet::new();
        let mut moves = Vec::new();
        for name in spec.moves() {
            if !legal.contains(name) {
                return Err(Error::IllegalMove {
                    creature: creature.name,
                    mv: name.to_string(),
                });
            }
            let mv = self
                .catalog
                .find_move(name)?
                .ok_or_else(|| Error::not_found(EntityKind::Move, name))?;
            if !seen.insert(name) {
                return Err(Error::DuplicateMove {
                    creature: creature.name,
                    mv: name.to_string(),
                });
            }
            moves.push(mv);
        }

        let item = match spec.item() {
            Some(name) => {
                let item = self
                    .catalog
                    .find_item(name)?
                    .ok_or_else(|| Error::not_found(EntityKind::Item, name))?;
                Some(ItemRef {
                    id: item.id,
                    name: item.name,
                })
            }
            None => None,
        };

        debug!(creature = %creature.name, moves = moves.len(), "member validated");
        Ok(ValidatedMember {
            creature_id: creature.id,
            creature: creature.name,
            ability,
            item,
            moves,
        })
    }

    /// Validate members in order, stopping at the first failure.
    pub fn validate_all(&self, specs: &[MemberSpec]) -> Result<Vec<ValidatedMember>> {
        specs.iter().map(|spec| self.validate(spec)).collect()
    }
}
