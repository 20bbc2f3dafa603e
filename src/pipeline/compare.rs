//! Per-entity category shares for side-by-side comparison.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::{DashboardError, Result};
use crate::pipeline::utility::pct;

/// Fewest entities a comparison view accepts.
pub const MIN_SELECTION: usize = 2;
/// Most entities a comparison view accepts.
pub const MAX_SELECTION: usize = 5;

/// Checks a selection size against the comparison view's bounds.
///
/// [`compare`] itself accepts any number of entities.
pub fn validate_selection(selected: usize) -> Result<()> {
    if selected < MIN_SELECTION {
        return Err(DashboardError::EmptySelection {
            selected,
            min: MIN_SELECTION,
        });
    }
    if selected > MAX_SELECTION {
        return Err(DashboardError::TooManySelected {
            selected,
            max: MAX_SELECTION,
        });
    }
    Ok(())
}

/// Raw category counts for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCounts {
    pub entity: String,
    pub counts: HashMap<String, u64>,
}

impl EntityCounts {
    pub fn new(entity: impl Into<String>, counts: HashMap<String, u64>) -> Self {
        EntityCounts {
            entity: entity.into(),
            counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityProfile {
    pub entity: String,
    pub total: u64,
    pub percentages: Vec<f64>,
}

impl EntityProfile {
    /// Percentages with the first repeated at the end, closing a radar
    /// polygon.
    pub fn closed_polygon(&self) -> Vec<f64> {
        let mut values = self.percentages.clone();
        if let Some(first) = self.percentages.first() {
            values.push(*first);
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub categories: Vec<String>,
    pub profiles: Vec<EntityProfile>,
}

impl ComparisonResult {
    pub fn profile(&self, entity: &str) -> Option<&EntityProfile> {
        self.profiles.iter().find(|p| p.entity == entity)
    }

    /// `(category, percentage)` pairs for `entity`, in category order.
    pub fn pairs(&self, entity: &str) -> Option<Vec<(&str, f64)>> {
        self.profile(entity).map(|p| {
            self.categories
                .iter()
                .map(String::as_str)
                .zip(p.percentages.iter().copied())
                .collect()
        })
    }
}

/// Normalizes each entity's counts over `categories` to percentages of that
/// entity's own total.
///
/// The total only covers the listed categories. Missing categories count as
/// zero, and an entity with a zero total gets all-zero percentages.
pub fn compare(entities: &[EntityCounts], categories: &[String]) -> ComparisonResult {
    let profiles = entities
        .iter()
        .map(|e| {
            let counts: Vec<u64> = categories
                .iter()
                .map(|c| e.counts.get(c).copied().unwrap_or(0))
                .collect();
            let total: u64 = counts.iter().sum();

            EntityProfile {
                entity: e.entity.clone(),
                total,
                percentages: counts.iter().map(|&c| pct(c, total)).collect(),
            }
        })
        .collect();

    ComparisonResult {
        categories: categories.to_vec(),
        profiles,
    }
}
