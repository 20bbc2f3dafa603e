//! Year-ordered medal counts and shares for a single entity.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::pipeline::aggregate::aggregate;
use crate::pipeline::utility::pct;
use crate::record::{Field, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMode {
    Count,
    Share,
}

impl std::str::FromStr for SeriesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "count" => Ok(SeriesMode::Count),
            "share" | "percentage" => Ok(SeriesMode::Share),
            other => Err(format!("unknown series mode '{other}'")),
        }
    }
}

/// Medals won by the entity in `year`, all medals awarded that year, and
/// the entity's share in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: i32,
    pub count: u64,
    pub total: u64,
    pub share: f64,
}

impl YearPoint {
    pub fn value(&self, mode: SeriesMode) -> f64 {
        match mode {
            SeriesMode::Count => self.count as f64,
            SeriesMode::Share => self.share,
        }
    }
}

fn medals_per_year(rows: &[&Record]) -> BTreeMap<i32, u64> {
    let table = aggregate(rows, &[Field::Year], Field::Medal, None);
    table
        .rows
        .iter()
        .filter_map(|row| Some((row.key.first()?.parse().ok()?, row.total())))
        .collect()
}

/// Joins the entity's medals per year with the overall medals per year.
///
/// Only years in which the entity won a medal are emitted, ascending.
pub fn year_series(entity_rows: &[&Record], all_rows: &[&Record]) -> Vec<YearPoint> {
    let entity = medals_per_year(entity_rows);
    let totals = medals_per_year(all_rows);

    entity
        .into_iter()
        .filter_map(|(year, count)| {
            totals.get(&year).map(|&total| YearPoint {
                year,
                count,
                total,
                share: pct(count, total),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Medal, Season, Sex};

    #[test]
    fn test_series_is_year_ordered_with_shares() {
        let rows = vec![
            record("Japan", 2008, Some(Medal::Gold)),
            record("USA", 2004, Some(Medal::Gold)),
            record("Japan", 2004, Some(Medal::Silver)),
            record("USA", 2004, Some(Medal::Bronze)),
            record("USA", 2008, Some(Medal::Gold)),
            record("Japan", 2004, None),
        ];
        let all: Vec<&Record> = rows.iter().collect();
        let japan: Vec<&Record> = rows.iter().filter(|r| r.team == "Japan").collect();

        let series = year_series(&japan, &all);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2004);
        assert_eq!(series[0].count, 1);
        assert_eq!(series[0].total, 3);
        assert!((series[0].share - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(series[1].year, 2008);
        assert_eq!(series[1].value(SeriesMode::Share), 50.0);
        assert_eq!(series[1].value(SeriesMode::Count), 1.0);
    }

    #[test]
    fn test_totals_match_year_table() {
        let rows = vec![
            record("USA", 2004, Some(Medal::Gold)),
            record("Japan", 2004, Some(Medal::Bronze)),
            record("Japan", 2004, None),
            record("Japan", 2008, Some(Medal::Silver)),
        ];
        let all: Vec<&Record> = rows.iter().collect();
        let table = aggregate(&all, &[Field::Year], Field::Medal, None);

        let series = year_series(&all, &all);
        for point in &series {
            let year = point.year.to_string();
            assert_eq!(table.row_total(&[year.as_str()]), Some(point.total));
            assert_eq!(point.count, point.total);
        }
        assert_eq!(series.iter().map(|p| p.total).sum::<u64>(), 3);
    }

    #[test]
    fn test_years_without_entity_medals_are_skipped() {
        let rows = vec![
            record("USA", 1996, Some(Medal::Gold)),
            record("Japan", 2000, Some(Medal::Gold)),
        ];
        let all: Vec<&Record> = rows.iter().collect();
        let japan: Vec<&Record> = rows.iter().filter(|r| r.team == "Japan").collect();

        let series = year_series(&japan, &all);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, 2000);
    }

    #[test]
    fn test_empty_entity_gives_empty_series() {
        let rows = vec![record("USA", 1996, Some(Medal::Gold))];
        let all: Vec<&Record> = rows.iter().collect();
        assert!(year_series(&[], &all).is_empty());
    }

    #[test]
    fn test_series_mode_from_str() {
        assert_eq!("count".parse::<SeriesMode>(), Ok(SeriesMode::Count));
        assert_eq!("Share".parse::<SeriesMode>(), Ok(SeriesMode::Share));
        assert!("pie".parse::<SeriesMode>().is_err());
    }

    fn record(team: &str, year: i32, medal: Option<Medal>) -> Record {
        Record {
            athlete_name: "Athlete".to_string(),
            sex: Sex::Female,
            age: Some(24),
            team: team.to_string(),
            noc: team.to_ascii_uppercase(),
            season: Season::Summer,
            year,
            sport: "Swimming".to_string(),
            event: "Swimming Women's 100 metres Freestyle".to_string(),
            medal,
        }
    }
}
