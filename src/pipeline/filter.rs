//! Row selection: medal, season, narrowing and team-medal deduplication.

use std::collections::HashSet;

use crate::record::{Field, Medal, Record, Season};

/// Keys identifying one medal awarded to a team. A relay or team event
/// produces one row per team member; collapsing on these keys counts the
/// medal once.
pub const TEAM_MEDAL_KEYS: [Field; 5] = [
    Field::Year,
    Field::Sport,
    Field::Event,
    Field::Medal,
    Field::Team,
];

/// Parameters for [`filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub season: Season,
    pub require_medal: bool,
    pub dedupe_keys: Option<Vec<Field>>,
    pub medal: Option<Medal>,
    pub team: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
}

impl FilterCriteria {
    pub fn new(season: Season) -> Self {
        FilterCriteria {
            season,
            require_medal: false,
            dedupe_keys: None,
            medal: None,
            team: None,
            sport: None,
            year: None,
        }
    }

    pub fn require_medal(mut self) -> Self {
        self.require_medal = true;
        self
    }

    pub fn dedupe_on(mut self, keys: &[Field]) -> Self {
        self.dedupe_keys = Some(keys.to_vec());
        self
    }

    pub fn medal(mut self, medal: Medal) -> Self {
        self.medal = Some(medal);
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn sport(mut self, sport: impl Into<String>) -> Self {
        self.sport = Some(sport.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    fn matches(&self, record: &Record) -> bool {
        if self.require_medal && record.medal.is_none() {
            return false;
        }
        if record.season != self.season {
            return false;
        }
        if self.medal.is_some() && record.medal != self.medal {
            return false;
        }
        if let Some(team) = &self.team {
            if &record.team != team {
                return false;
            }
        }
        if let Some(sport) = &self.sport {
            if &record.sport != sport {
                return false;
            }
        }
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        true
    }
}

/// Selects the records matching `criteria`, preserving input order.
///
/// With dedupe keys set, only the first record of each distinct key tuple is
/// kept. Absent values take part in the key like any other value.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
    let mut out = Vec::new();

    for record in records {
        if !criteria.matches(record) {
            continue;
        }

        if let Some(keys) = &criteria.dedupe_keys {
            let key: Vec<Option<String>> = keys.iter().map(|f| record.value(*f)).collect();
            if !seen.insert(key) {
                continue;
            }
        }

        out.push(record);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sex;

    #[test]
    fn test_team_medal_collapses_to_one_record() {
        let records = vec![
            record("A", "Japan", "Judo", Some(Medal::Gold), 2004),
            record("A", "Japan", "Judo", Some(Medal::Gold), 2004),
        ];
        let criteria = FilterCriteria::new(Season::Summer)
            .require_medal()
            .dedupe_on(&[Field::Year, Field::Sport, Field::Medal, Field::Team]);

        let out = filter(&records, &criteria);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let records = vec![
            record("First", "USA", "Swimming", Some(Medal::Gold), 2008),
            record("Second", "USA", "Swimming", Some(Medal::Gold), 2008),
        ];
        let criteria = FilterCriteria::new(Season::Summer).dedupe_on(&TEAM_MEDAL_KEYS);

        let out = filter(&records, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].athlete_name, "First");
    }

    #[test]
    fn test_drops_records_without_medal() {
        let records = vec![
            record("A", "USA", "Rowing", None, 2000),
            record("B", "USA", "Rowing", Some(Medal::Bronze), 2000),
        ];
        let out = filter(&records, &FilterCriteria::new(Season::Summer).require_medal());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].athlete_name, "B");

        let all = filter(&records, &FilterCriteria::new(Season::Summer));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_unmatched_season_yields_empty() {
        let records = vec![record("A", "USA", "Rowing", Some(Medal::Gold), 2000)];
        let out = filter(&records, &FilterCriteria::new(Season::Winter));
        assert!(out.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            record("A", "USA", "Swimming", Some(Medal::Gold), 2008),
            record("B", "USA", "Swimming", Some(Medal::Gold), 2008),
            record("C", "USA", "Swimming", Some(Medal::Silver), 2008),
            record("D", "Japan", "Judo", None, 2008),
        ];
        let criteria = FilterCriteria::new(Season::Summer)
            .require_medal()
            .dedupe_on(&TEAM_MEDAL_KEYS);

        let once = filter(&records, &criteria);
        let twice = filter(once.iter().copied(), &criteria);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_narrowing_by_team_sport_year_and_medal() {
        let records = vec![
            record("A", "USA", "Swimming", Some(Medal::Gold), 2008),
            record("B", "USA", "Athletics", Some(Medal::Gold), 2008),
            record("C", "USA", "Swimming", Some(Medal::Silver), 2012),
            record("D", "Japan", "Swimming", Some(Medal::Gold), 2008),
        ];

        let by_team = filter(&records, &FilterCriteria::new(Season::Summer).team("USA"));
        assert_eq!(by_team.len(), 3);

        let narrowed = filter(
            &records,
            &FilterCriteria::new(Season::Summer)
                .team("USA")
                .sport("Swimming")
                .year(2008)
                .medal(Medal::Gold),
        );
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].athlete_name, "A");
    }

    fn record(name: &str, team: &str, sport: &str, medal: Option<Medal>, year: i32) -> Record {
        Record {
            athlete_name: name.to_string(),
            sex: Sex::Male,
            age: Some(25),
            team: team.to_string(),
            noc: team.to_ascii_uppercase(),
            season: Season::Summer,
            year,
            sport: sport.to_string(),
            event: format!("{sport} Men's Team"),
            medal,
        }
    }
}
