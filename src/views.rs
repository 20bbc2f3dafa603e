//! Data behind each dashboard page, built on the shared [`Pipeline`].

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::pipeline::Pipeline;
use crate::pipeline::aggregate::AggregationResult;
use crate::pipeline::compare::{ComparisonResult, validate_selection};
use crate::pipeline::filter::FilterCriteria;
use crate::pipeline::series::{YearPoint, year_series};
use crate::record::{Field, Medal, Record, Season};

/// Season display table plus medal counts by country, sex and age.
#[derive(Debug, Serialize)]
pub struct Overview<'a> {
    pub season: Season,
    pub records: Vec<&'a Record>,
    pub by_country: AggregationResult,
    pub by_sex: AggregationResult,
    pub by_age: AggregationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteRow<'a> {
    pub name: &'a str,
    pub year: i32,
    pub sport: &'a str,
    pub event: &'a str,
    pub medal: Option<Medal>,
}

impl<'a> From<&'a Record> for AthleteRow<'a> {
    fn from(r: &'a Record) -> Self {
        AthleteRow {
            name: &r.athlete_name,
            year: r.year,
            sport: &r.sport,
            event: &r.event,
            medal: r.medal,
        }
    }
}

impl AthleteRow<'_> {
    /// Display text of one listing column; fields a listing never shows are
    /// blank.
    pub fn cell(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.to_string(),
            Field::Year => self.year.to_string(),
            Field::Sport => self.sport.to_string(),
            Field::Event => self.event.to_string(),
            Field::Medal => self.medal.map(|m| m.as_str()).unwrap_or("").to_string(),
            _ => String::new(),
        }
    }
}

/// What an [`AthleteListing`] was selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListingKind {
    Sport,
    Year,
}

impl ListingKind {
    /// Columns shown for the listing; the selecting field is left out.
    pub fn columns(&self) -> &'static [Field] {
        match self {
            ListingKind::Sport => &[Field::Name, Field::Event, Field::Medal],
            ListingKind::Year => &[Field::Name, Field::Sport, Field::Event, Field::Medal],
        }
    }
}

/// Medal winners matching one selection (a sport or a year).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteListing<'a> {
    pub kind: ListingKind,
    pub label: String,
    pub rows: Vec<AthleteRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CountryProfile<'a> {
    pub team: String,
    pub season: Season,
    pub medals: AggregationResult,
    pub series: Vec<YearPoint>,
    pub sports: Vec<String>,
    pub years: Vec<i32>,
    pub sport_athletes: Option<AthleteListing<'a>>,
    pub year_athletes: Option<AthleteListing<'a>>,
}

/// Read-only view over the loaded dataset.
pub struct Dashboard<'a> {
    records: &'a [Record],
    pipeline: &'a Pipeline,
}

impl<'a> Dashboard<'a> {
    pub fn new(records: &'a [Record], pipeline: &'a Pipeline) -> Self {
        Dashboard { records, pipeline }
    }

    fn medal_rows(&self, season: Season) -> Vec<&'a Record> {
        self.pipeline
            .filter(self.records, &self.pipeline.medal_criteria(season))
    }

    #[tracing::instrument(skip(self))]
    pub fn overview(&self, season: Season) -> Overview<'a> {
        let records = self.pipeline.filter(self.records, &FilterCriteria::new(season));
        let medals = self.medal_rows(season);

        let by_country = self.pipeline.aggregate(&medals, &[Field::Noc], Field::Medal);
        let by_sex = self.pipeline.aggregate(&medals, &[Field::Sex], Field::Medal);
        let mut by_age = self.pipeline.aggregate(&medals, &[Field::Age], Field::Medal);
        by_age.sort_rows_numeric();

        info!(
            rows = records.len(),
            countries = by_country.len(),
            "Overview built"
        );

        Overview {
            season,
            records,
            by_country,
            by_sex,
            by_age,
        }
    }

    /// Arbitrary group-by/pivot table over the season's medal rows.
    #[tracing::instrument(skip(self))]
    pub fn table(
        &self,
        season: Season,
        group_by: &[Field],
        pivot_on: Field,
    ) -> AggregationResult {
        let medals = self.medal_rows(season);
        let rows = self.pipeline.classify(&medals);
        let mut result = self.pipeline.aggregate(&rows, group_by, pivot_on);
        result.sort_rows_numeric();
        result
    }

    /// Teams with at least one medal in `season`, sorted.
    pub fn teams(&self, season: Season) -> Vec<String> {
        self.medal_rows(season)
            .into_iter()
            .map(|r| r.team.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Medal history of one team, optionally listing the winners of one
    /// sport and one year.
    ///
    /// # Errors
    ///
    /// [`DashboardError::EmptyResult`] if the team won nothing in `season`.
    #[tracing::instrument(skip(self))]
    pub fn country_profile(
        &self,
        team: &str,
        season: Season,
        sport: Option<&str>,
        year: Option<i32>,
    ) -> Result<CountryProfile<'a>> {
        let all = self.medal_rows(season);
        let team_rows: Vec<&'a Record> = all.iter().copied().filter(|r| r.team == team).collect();

        if team_rows.is_empty() {
            return Err(DashboardError::EmptyResult(format!(
                "{team} at the {} Games",
                season.as_str()
            )));
        }

        let medals = self.pipeline.aggregate(&team_rows, &[Field::Team], Field::Medal);
        let series = year_series(&team_rows, &all);

        let sports: Vec<String> = team_rows
            .iter()
            .map(|r| r.sport.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let years: Vec<i32> = team_rows
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let sport_athletes = sport.map(|s| AthleteListing {
            kind: ListingKind::Sport,
            label: s.to_string(),
            rows: team_rows
                .iter()
                .filter(|r| r.sport == s)
                .map(|&r| AthleteRow::from(r))
                .collect(),
        });
        let year_athletes = year.map(|y| AthleteListing {
            kind: ListingKind::Year,
            label: y.to_string(),
            rows: team_rows
                .iter()
                .filter(|r| r.year == y)
                .map(|&r| AthleteRow::from(r))
                .collect(),
        });

        info!(
            medals = team_rows.len(),
            years = years.len(),
            "Country profile built"
        );

        Ok(CountryProfile {
            team: team.to_string(),
            season,
            medals,
            series,
            sports,
            years,
            sport_athletes,
            year_athletes,
        })
    }

    /// Category profile comparison between 2 and 5 teams. `medal` restricts
    /// the counted medals to one kind (gold in the default view).
    ///
    /// # Errors
    ///
    /// [`DashboardError::EmptySelection`] or [`DashboardError::TooManySelected`]
    /// when the selection size is out of bounds; nothing is computed then.
    #[tracing::instrument(skip(self))]
    pub fn versus(
        &self,
        teams: &[String],
        season: Season,
        medal: Option<Medal>,
    ) -> Result<ComparisonResult> {
        let mut selected: Vec<String> = Vec::with_capacity(teams.len());
        for team in teams {
            if !selected.contains(team) {
                selected.push(team.clone());
            }
        }
        validate_selection(selected.len())?;

        let mut criteria = self.pipeline.medal_criteria(season);
        if let Some(medal) = medal {
            criteria = criteria.medal(medal);
        }
        let rows = self.pipeline.filter(self.records, &criteria);

        let counts = self.pipeline.category_counts(&rows, &selected);
        for entity in counts.iter().filter(|e| e.counts.is_empty()) {
            warn!(team = %entity.entity, "Selected team has no matching medals");
        }

        Ok(self.pipeline.compare(&counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DedupePolicy;
    use crate::pipeline::classify::CategoryMap;
    use crate::record::Sex;

    #[test]
    fn test_overview_counts_by_country_and_age() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let overview = dashboard.overview(Season::Summer);

        // display table keeps medal-less rows, drops winter
        assert_eq!(overview.records.len(), 6);
        assert_eq!(overview.by_country.count(&["JPN"], "Gold"), Some(1));
        assert_eq!(overview.by_country.count(&["USA"], "Gold"), Some(1));
        assert_eq!(overview.by_country.count(&["USA"], "Silver"), Some(1));
        assert_eq!(overview.by_sex.count(&["F"], "Gold"), Some(1));
        let ages: Vec<&str> = overview.by_age.rows.iter().map(|r| r.key[0].as_str()).collect();
        assert_eq!(ages, vec!["19", "22", "30"]);
    }

    #[test]
    fn test_dedupe_policy_applies_to_every_view() {
        let records = dataset();
        let counted = Pipeline::new(CategoryMap::default(), DedupePolicy::None);
        let dashboard = Dashboard::new(&records, &counted);

        let overview = dashboard.overview(Season::Summer);
        assert_eq!(overview.by_country.count(&["USA"], "Gold"), Some(2));

        let profile = dashboard
            .country_profile("United States", Season::Summer, None, None)
            .unwrap();
        assert_eq!(profile.medals.count(&["United States"], "Gold"), Some(2));
    }

    #[test]
    fn test_country_profile_lists_and_series() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let profile = dashboard
            .country_profile("United States", Season::Summer, Some("Swimming"), Some(2008))
            .unwrap();

        assert_eq!(profile.sports, vec!["Athletics".to_string(), "Swimming".to_string()]);
        assert_eq!(profile.years, vec![2004, 2008]);
        assert_eq!(profile.series.len(), 2);
        assert_eq!(profile.series[0].year, 2004);
        assert_eq!(profile.series[0].share, 50.0);
        assert_eq!(profile.sport_athletes.as_ref().unwrap().rows.len(), 1);
        assert_eq!(profile.year_athletes.as_ref().unwrap().rows.len(), 1);
        assert_eq!(profile.year_athletes.as_ref().unwrap().rows[0].sport, "Swimming");
        assert_eq!(profile.sport_athletes.unwrap().kind, ListingKind::Sport);
        assert_eq!(profile.year_athletes.unwrap().kind, ListingKind::Year);
    }

    #[test]
    fn test_country_profile_unknown_team_is_empty_result() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let result = dashboard.country_profile("Atlantis", Season::Summer, None, None);
        assert!(matches!(result, Err(DashboardError::EmptyResult(_))));
    }

    #[test]
    fn test_versus_requires_two_teams() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let result = dashboard.versus(
            &["Japan".into(), "Japan".into()],
            Season::Summer,
            Some(Medal::Gold),
        );
        assert!(matches!(
            result,
            Err(DashboardError::EmptySelection { selected: 1, .. })
        ));
    }

    #[test]
    fn test_versus_gold_profiles() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let result = dashboard
            .versus(
                &["Japan".into(), "United States".into()],
                Season::Summer,
                Some(Medal::Gold),
            )
            .unwrap();

        assert_eq!(
            result.profile("Japan").unwrap().percentages,
            vec![0.0, 0.0, 100.0, 0.0, 0.0]
        );
        assert_eq!(
            result.profile("United States").unwrap().percentages,
            vec![100.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_teams_are_sorted_medal_winners() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        assert_eq!(
            dashboard.teams(Season::Summer),
            vec!["Japan".to_string(), "United States".to_string()]
        );
        assert_eq!(dashboard.teams(Season::Winter), vec!["Norway".to_string()]);
    }

    #[test]
    fn test_table_by_category() {
        let records = dataset();
        let pipeline = Pipeline::default();
        let dashboard = Dashboard::new(&records, &pipeline);

        let table = dashboard.table(Season::Summer, &[Field::Category], Field::Medal);
        assert_eq!(table.count(&["Swimming"], "Gold"), Some(1));
        assert_eq!(table.count(&["Athletics"], "Silver"), Some(1));
        assert_eq!(table.count(&["CombatSports"], "Bronze"), Some(0));
    }

    fn dataset() -> Vec<Record> {
        vec![
            record("Swimmer A", "United States", "USA", "Swimming", 2008, Some(Medal::Gold), 22),
            record("Swimmer B", "United States", "USA", "Swimming", 2008, Some(Medal::Gold), 22),
            record("Runner", "United States", "USA", "Athletics", 2004, Some(Medal::Silver), 30),
            record("Judoka", "Japan", "JPN", "Judo", 2004, Some(Medal::Gold), 19),
            record("Hopeful", "Japan", "JPN", "Judo", 2008, None, 20),
            record("Fencer", "Japan", "JPN", "Fencing", 2008, None, 25),
            Record {
                season: Season::Winter,
                ..record("Skier", "Norway", "NOR", "Biathlon", 2002, Some(Medal::Gold), 28)
            },
        ]
        .into_iter()
        .enumerate()
        .map(|(i, mut r)| {
            if i == 3 {
                r.sex = Sex::Female;
            }
            r
        })
        .collect()
    }

    fn record(
        name: &str,
        team: &str,
        noc: &str,
        sport: &str,
        year: i32,
        medal: Option<Medal>,
        age: u32,
    ) -> Record {
        Record {
            athlete_name: name.to_string(),
            sex: Sex::Male,
            age: Some(age),
            team: team.to_string(),
            noc: noc.to_string(),
            season: Season::Summer,
            year,
            sport: sport.to_string(),
            event: format!("{sport} Team"),
            medal,
        }
    }
}
