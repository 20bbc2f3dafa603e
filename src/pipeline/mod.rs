//! Medal aggregation pipeline.
//!
//! Records flow one way through the stages: [`filter`] selects and
//! deduplicates rows, [`classify`] attaches a sport category, [`aggregate`]
//! builds dense count tables, and [`compare`] turns per-entity counts into
//! percentage profiles. [`series`] derives the per-year view of one entity.
//! Every stage returns a new value; nothing is modified in place.

pub mod aggregate;
pub mod classify;
pub mod compare;
pub mod filter;
pub mod series;
pub mod utility;

use tracing::debug;

use crate::pipeline::aggregate::{AggregationResult, FieldSource};
use crate::pipeline::classify::{CategoryMap, Classified};
use crate::pipeline::compare::{ComparisonResult, EntityCounts};
use crate::pipeline::filter::{FilterCriteria, TEAM_MEDAL_KEYS};
use crate::record::{Field, Medal, Record, Season, Sex};

/// How team medals are counted. Applied the same way in every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupePolicy {
    /// One count per medal per team, collapsing on [`TEAM_MEDAL_KEYS`].
    #[default]
    TeamMedals,
    /// One count per athlete row.
    None,
}

/// The shared Filter → Classify → Aggregate → Compare pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    categories: CategoryMap,
    dedupe: DedupePolicy,
}

impl Pipeline {
    pub fn new(categories: CategoryMap, dedupe: DedupePolicy) -> Self {
        Pipeline { categories, dedupe }
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn dedupe_policy(&self) -> DedupePolicy {
        self.dedupe
    }

    /// Criteria for medal-winning rows of `season` under this pipeline's
    /// dedupe policy.
    pub fn medal_criteria(&self, season: Season) -> FilterCriteria {
        let criteria = FilterCriteria::new(season).require_medal();
        match self.dedupe {
            DedupePolicy::TeamMedals => criteria.dedupe_on(&TEAM_MEDAL_KEYS),
            DedupePolicy::None => criteria,
        }
    }

    pub fn filter<'a, I>(&self, records: I, criteria: &FilterCriteria) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let rows = filter::filter(records, criteria);
        debug!(rows = rows.len(), season = criteria.season.as_str(), "Filtered records");
        rows
    }

    pub fn classify<'a>(&'a self, records: &[&'a Record]) -> Vec<Classified<'a>> {
        classify::classify_records(records, &self.categories)
    }

    /// Dense count table with the pivot domain implied by `pivot_on`.
    pub fn aggregate<R: FieldSource>(
        &self,
        rows: &[R],
        group_by: &[Field],
        pivot_on: Field,
    ) -> AggregationResult {
        let domain = self.pivot_domain(pivot_on);
        let result = aggregate::aggregate(rows, group_by, pivot_on, domain.as_deref());
        debug!(
            groups = result.len(),
            columns = result.columns.len(),
            pivot = pivot_on.name(),
            "Aggregated"
        );
        result
    }

    /// Fixed columns for enumerated fields; `None` means observed values.
    pub fn pivot_domain(&self, pivot_on: Field) -> Option<Vec<String>> {
        match pivot_on {
            Field::Medal => Some(Medal::ALL.iter().map(|m| m.as_str().to_string()).collect()),
            Field::Category => Some(self.categories.all_categories()),
            Field::Sex => Some(Sex::ALL.iter().map(|s| s.as_str().to_string()).collect()),
            Field::Season => Some(Season::ALL.iter().map(|s| s.as_str().to_string()).collect()),
            _ => None,
        }
    }

    /// Per-team category counts for each of `teams`, zero-filled for teams
    /// with no matching rows.
    pub fn category_counts(&self, records: &[&Record], teams: &[String]) -> Vec<EntityCounts> {
        let classified = self.classify(records);
        let table = self.aggregate(&classified, &[Field::Team], Field::Category);

        teams
            .iter()
            .map(|team| EntityCounts::new(team.clone(), table.counts_for(&[team.as_str()])))
            .collect()
    }

    /// Percentage profiles over the named categories (the default category
    /// is left out, as in the comparison view).
    pub fn compare(&self, entities: &[EntityCounts]) -> ComparisonResult {
        compare::compare(entities, self.categories.named_categories())
    }
}
