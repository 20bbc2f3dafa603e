//! Row types read from the athlete/medal dataset.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M", alias = "Male")]
    Male,
    #[serde(rename = "F", alias = "Female")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 2] = [Season::Summer, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Column order used for every medal pivot.
    pub const ALL: [Medal; 3] = [Medal::Gold, Medal::Silver, Medal::Bronze];

    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "Gold",
            Medal::Silver => "Silver",
            Medal::Bronze => "Bronze",
        }
    }
}

impl FromStr for Medal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gold" => Ok(Medal::Gold),
            "silver" => Ok(Medal::Silver),
            "bronze" => Ok(Medal::Bronze),
            other => Err(format!("unknown medal '{other}'")),
        }
    }
}

/// One athlete-event row. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Name")]
    pub athlete_name: String,
    #[serde(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "Age", default, deserialize_with = "deserialize_age")]
    pub age: Option<u32>,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "NOC")]
    pub noc: String,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Sport")]
    pub sport: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Medal", default, deserialize_with = "deserialize_medal")]
    pub medal: Option<Medal>,
}

impl Record {
    /// Display value of `field`, `None` when the cell is absent.
    ///
    /// [`Field::Category`] is derived by the classifier and is always `None`
    /// on a raw record.
    pub fn value(&self, field: Field) -> Option<String> {
        match field {
            Field::Name => Some(self.athlete_name.clone()),
            Field::Sex => Some(self.sex.as_str().to_string()),
            Field::Age => self.age.map(|a| a.to_string()),
            Field::Team => Some(self.team.clone()),
            Field::Noc => Some(self.noc.clone()),
            Field::Season => Some(self.season.as_str().to_string()),
            Field::Year => Some(self.year.to_string()),
            Field::Sport => Some(self.sport.clone()),
            Field::Event => Some(self.event.clone()),
            Field::Medal => self.medal.map(|m| m.as_str().to_string()),
            Field::Category => None,
        }
    }
}

/// Attributes that can be grouped, pivoted or deduplicated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Name,
    Sex,
    Age,
    Team,
    Noc,
    Season,
    Year,
    Sport,
    Event,
    Medal,
    Category,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Sex => "Sex",
            Field::Age => "Age",
            Field::Team => "Team",
            Field::Noc => "NOC",
            Field::Season => "Season",
            Field::Year => "Year",
            Field::Sport => "Sport",
            Field::Event => "Event",
            Field::Medal => "Medal",
            Field::Category => "Category",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "name" => Field::Name,
            "sex" | "gender" => Field::Sex,
            "age" => Field::Age,
            "team" | "country" => Field::Team,
            "noc" => Field::Noc,
            "season" => Field::Season,
            "year" => Field::Year,
            "sport" => Field::Sport,
            "event" => Field::Event,
            "medal" => Field::Medal,
            "category" => Field::Category,
            other => return Err(format!("unknown field '{other}'")),
        };
        Ok(field)
    }
}

fn is_absent(raw: &str) -> bool {
    raw.is_empty() || raw == "NA"
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some(s) if is_absent(s) => Ok(None),
        // ages are sometimes exported as floats ("24.0")
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => {
                Ok(Some(v as u32))
            }
            _ => Err(de::Error::custom(format!("invalid age '{s}'"))),
        },
    }
}

fn deserialize_medal<'de, D>(deserializer: D) -> Result<Option<Medal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some(s) if is_absent(s) => Ok(None),
        Some(s) => s.parse::<Medal>().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_for_absent_cells() {
        let mut record = sample();
        record.age = None;
        record.medal = None;

        assert_eq!(record.value(Field::Age), None);
        assert_eq!(record.value(Field::Medal), None);
        assert_eq!(record.value(Field::Category), None);
    }

    #[test]
    fn test_value_for_present_cells() {
        let record = sample();

        assert_eq!(record.value(Field::Sex).as_deref(), Some("F"));
        assert_eq!(record.value(Field::Year).as_deref(), Some("2004"));
        assert_eq!(record.value(Field::Medal).as_deref(), Some("Gold"));
        assert_eq!(record.value(Field::Noc).as_deref(), Some("JPN"));
    }

    #[test]
    fn test_field_from_str_accepts_aliases() {
        assert_eq!("country".parse::<Field>(), Ok(Field::Team));
        assert_eq!("Gender".parse::<Field>(), Ok(Field::Sex));
        assert_eq!("NOC".parse::<Field>(), Ok(Field::Noc));
        assert!("height".parse::<Field>().is_err());
    }

    #[test]
    fn test_medal_and_season_from_str() {
        assert_eq!("gold".parse::<Medal>(), Ok(Medal::Gold));
        assert_eq!("Winter".parse::<Season>(), Ok(Season::Winter));
        assert!("tin".parse::<Medal>().is_err());
    }

    fn sample() -> Record {
        Record {
            athlete_name: "Ryoko Tani".to_string(),
            sex: Sex::Female,
            age: Some(28),
            team: "Japan".to_string(),
            noc: "JPN".to_string(),
            season: Season::Summer,
            year: 2004,
            sport: "Judo".to_string(),
            event: "Judo Women's Extra-Lightweight".to_string(),
            medal: Some(Medal::Gold),
        }
    }
}
