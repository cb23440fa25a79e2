//! Move search filters.

use serde::Deserialize;

use super::MoveRow;
use crate::error::{Error, Result};

/// Page size used when a query does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a query may request.
pub const MAX_PAGE_SIZE: usize = 100;

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Filters for [`Catalog::search_moves`](super::Catalog::search_moves).
///
/// Every filter is optional and they combine with AND. A move with no power
/// (or no accuracy) never satisfies a power (or accuracy) bound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveQuery {
    #[serde(default, rename = "type")]
    pub move_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_power: Option<u32>,
    #[serde(default)]
    pub max_power: Option<u32>,
    #[serde(default)]
    pub min_accuracy: Option<u32>,
    #[serde(default)]
    pub max_accuracy: Option<u32>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for MoveQuery {
    fn default() -> Self {
        Self {
            move_type: None,
            category: None,
            min_power: None,
            max_power: None,
            min_accuracy: None,
            max_accuracy: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl MoveQuery {
    /// Match every move, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only moves of this type.
    pub fn with_type(mut self, move_type: impl Into<String>) -> Self {
        self.move_type = Some(move_type.into());
        self
    }

    /// Only moves of this category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Inclusive power range.
    pub fn with_power(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_power = min;
        self.max_power = max;
        self
    }

    /// Inclusive accuracy range.
    pub fn with_accuracy(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_accuracy = min;
        self.max_accuracy = max;
        self
    }

    /// Page window.
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Reject page sizes above [`MAX_PAGE_SIZE`].
    pub fn validate(&self) -> Result<()> {
        if self.limit > MAX_PAGE_SIZE {
            return Err(Error::InvalidInput(format!(
                "limit must be at most {MAX_PAGE_SIZE}, got {}",
                self.limit
            )));
        }
        Ok(())
    }

    /// Whether `mv` passes every filter.
    pub fn matches(&self, mv: &MoveRow) -> bool {
        if self.move_type.as_deref().is_some_and(|t| t != mv.move_type) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != mv.category) {
            return false;
        }
        within(mv.power, self.min_power, self.max_power)
            && within(mv.accuracy, self.min_accuracy, self.max_accuracy)
    }
}

/// Range check where an absent value fails any bound that is set.
fn within(value: Option<u32>, min: Option<u32>, max: Option<u32>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    match value {
        Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
        None => false,
    }
}
