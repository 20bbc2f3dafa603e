//! Sport → category classification.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::pipeline::aggregate::FieldSource;
use crate::record::{Field, Record};

/// Built-in table: (sport, category). Sports not listed fall into
/// [`DEFAULT_CATEGORY`].
static BUILTIN_SPORTS: &[(&str, &str)] = &[
    ("Swimming", "Swimming"),
    ("Athletics", "Athletics"),
    ("Wrestling", "CombatSports"),
    ("Fencing", "CombatSports"),
    ("Judo", "CombatSports"),
    ("Boxing", "CombatSports"),
    ("Taekwondo", "CombatSports"),
    ("Karate", "CombatSports"),
    ("Modern Pentathlon", "CombatSports"),
    ("Handball", "BallSports"),
    ("Football", "BallSports"),
    ("Basketball", "BallSports"),
    ("Volleyball", "BallSports"),
    ("Water Polo", "BallSports"),
    ("Baseball", "BallSports"),
    ("Softball", "BallSports"),
    ("Ice Hockey", "BallSports"),
    ("Field Hockey", "BallSports"),
    ("Rugby", "BallSports"),
    ("Equestrian", "VehicleSports"),
    ("Canoeing", "VehicleSports"),
    ("Cycling", "VehicleSports"),
    ("Rowing", "VehicleSports"),
    ("Sailing", "VehicleSports"),
    ("Shooting", "VehicleSports"),
    ("Archery", "Other"),
    ("Artistic Gymnastics", "Other"),
    ("Rhythmic Gymnastics", "Other"),
    ("Triathlon", "Other"),
    ("Diving", "Other"),
    ("Synchronized Swimming", "Other"),
    ("Table Tennis", "Other"),
    ("Badminton", "Other"),
    ("Tennis", "Other"),
    ("Golf", "Other"),
    ("Other Sports", "Other"),
];

static BUILTIN_CATEGORIES: &[&str] = &[
    "Swimming",
    "Athletics",
    "CombatSports",
    "BallSports",
    "VehicleSports",
];

pub const DEFAULT_CATEGORY: &str = "Other";

/// Immutable sport → category table.
///
/// `categories` lists the named categories in display order; `default` is
/// returned for any sport missing from `sports`. Loaded from JSON shaped as
/// ```json
/// {
///   "categories": ["Swimming", "Athletics"],
///   "default": "Other",
///   "sports": { "Swimming": "Swimming", "Marathon Swimming": "Swimming" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    categories: Vec<String>,
    default: String,
    sports: BTreeMap<String, String>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        CategoryMap {
            categories: BUILTIN_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            default: DEFAULT_CATEGORY.to_string(),
            sports: BUILTIN_SPORTS
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
        }
    }
}

impl CategoryMap {
    /// Builds a map from explicit parts, validating that every sport points
    /// at a declared category or the default.
    pub fn new(
        categories: Vec<String>,
        default: impl Into<String>,
        sports: BTreeMap<String, String>,
    ) -> Result<Self> {
        let map = CategoryMap {
            categories,
            default: default.into(),
            sports,
        };
        map.validate()?;
        Ok(map)
    }

    /// Loads a map from the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            DashboardError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let map: CategoryMap = serde_json::from_str(content)
            .map_err(|e| DashboardError::InvalidCategoryMap(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<()> {
        if self.default.is_empty() {
            return Err(DashboardError::InvalidCategoryMap(
                "default category is empty".into(),
            ));
        }

        let mut declared = HashSet::new();
        for category in &self.categories {
            if !declared.insert(category.as_str()) {
                return Err(DashboardError::InvalidCategoryMap(format!(
                    "category '{category}' declared twice"
                )));
            }
        }

        for (sport, category) in &self.sports {
            if category != &self.default && !declared.contains(category.as_str()) {
                return Err(DashboardError::InvalidCategoryMap(format!(
                    "sport '{sport}' maps to undeclared category '{category}'"
                )));
            }
        }

        Ok(())
    }

    /// Category of `sport`. Total: unmapped sports get the default.
    pub fn classify(&self, sport: &str) -> &str {
        self.sports
            .get(sport)
            .map(String::as_str)
            .unwrap_or(self.default.as_str())
    }

    /// Named categories in display order, without the default.
    pub fn named_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }

    /// Named categories followed by the default, the full pivot domain.
    pub fn all_categories(&self) -> Vec<String> {
        let mut all = self.categories.clone();
        if !all.contains(&self.default) {
            all.push(self.default.clone());
        }
        all
    }

    /// `(sport, category)` pairs ordered by category, then sport.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let order = self.all_categories();
        let rank = |c: &str| order.iter().position(|o| o == c).unwrap_or(order.len());

        let mut entries: Vec<(&str, &str)> = self
            .sports
            .iter()
            .map(|(s, c)| (s.as_str(), c.as_str()))
            .collect();
        entries.sort_by(|a, b| rank(a.1).cmp(&rank(b.1)).then(a.0.cmp(b.0)));
        entries
    }
}

/// A record paired with the category of its sport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified<'a> {
    pub record: &'a Record,
    pub category: &'a str,
}

impl FieldSource for Classified<'_> {
    fn value(&self, field: Field) -> Option<String> {
        match field {
            Field::Category => Some(self.category.to_string()),
            other => self.record.value(other),
        }
    }
}

/// Attaches a category to every record.
pub fn classify_records<'a>(records: &[&'a Record], map: &'a CategoryMap) -> Vec<Classified<'a>> {
    records
        .iter()
        .map(|&record| Classified {
            record,
            category: map.classify(&record.sport),
        })
        .collect()
}
