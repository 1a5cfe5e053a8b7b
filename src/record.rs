use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the upstream JSON document, as published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Nationality")]
    pub nationality: String,
    #[serde(rename = "Doping", default)]
    pub doping: String,
    #[serde(rename = "Place", default)]
    pub place: Option<u32>,
    #[serde(rename = "Seconds", default)]
    pub seconds: Option<u32>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
}

/// Lap duration expressed as a time of day on 1970-01-01 UTC.
///
/// Only minutes and seconds carry meaning. A `Time` string that cannot be
/// split into two integers becomes `Invalid` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LapTime {
    At(DateTime<Utc>),
    Invalid,
}

impl LapTime {
    pub fn parse(raw: &str) -> Self {
        let Some((min, sec)) = raw.split_once(':') else {
            return LapTime::Invalid;
        };
        let (Ok(min), Ok(sec)) = (min.trim().parse::<i64>(), sec.trim().parse::<i64>()) else {
            return LapTime::Invalid;
        };
        // Out-of-range fields roll over into the next unit.
        let offset = Duration::try_minutes(min)
            .zip(Duration::try_seconds(sec))
            .and_then(|(m, s)| m.checked_add(&s));
        Utc.timestamp_opt(0, 0)
            .single()
            .zip(offset)
            .and_then(|(day, offset)| day.checked_add_signed(offset))
            .map(LapTime::At)
            .unwrap_or(LapTime::Invalid)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, LapTime::At(_))
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            LapTime::At(t) => Some(*t),
            LapTime::Invalid => None,
        }
    }

    pub fn epoch_ms(&self) -> Option<i64> {
        self.as_datetime().map(|t| t.timestamp_millis())
    }

    /// `1970-01-01T00:36:50.000Z`
    pub fn iso(&self) -> String {
        match self {
            LapTime::At(t) => t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            LapTime::Invalid => "Invalid Date".to_string(),
        }
    }

    /// `36:50`
    pub fn minutes_seconds(&self) -> String {
        match self {
            LapTime::At(t) => t.format("%M:%S").to_string(),
            LapTime::Invalid => "Invalid Date".to_string(),
        }
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.minutes_seconds())
    }
}

/// A race record after its lap time has been parsed.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: LapTime,
    pub time_raw: String,
    pub year: i32,
    pub name: String,
    pub nationality: String,
    pub doping: String,
    pub place: Option<u32>,
    pub seconds: Option<u32>,
    pub url: Option<String>,
}

impl Record {
    pub fn has_doping_allegation(&self) -> bool {
        !self.doping.is_empty()
    }
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Self {
            time: LapTime::parse(&raw.time),
            time_raw: raw.time,
            year: raw.year,
            name: raw.name,
            nationality: raw.nationality,
            doping: raw.doping,
            place: raw.place,
            seconds: raw.seconds,
            url: raw.url,
        }
    }
}

/// `[min, max]` of the years, or `None` for an empty slice.
pub fn year_extent(records: &[Record]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}

/// `[min, max]` of the valid lap times; invalid values are ignored.
pub fn time_extent(records: &[Record]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let valid = || records.iter().filter_map(|r| r.time.as_datetime());
    Some((valid().min()?, valid().max()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: &str, year: i32, doping: &str) -> Record {
        Record::from(RawRecord {
            time: time.to_string(),
            year,
            name: "Rider".to_string(),
            nationality: "ITA".to_string(),
            doping: doping.to_string(),
            place: None,
            seconds: None,
            url: None,
        })
    }

    #[test]
    fn parses_minutes_and_seconds_on_epoch_day() {
        let t = LapTime::parse("36:50");
        assert_eq!(t.epoch_ms(), Some((36 * 60 + 50) * 1000));
        assert_eq!(t.iso(), "1970-01-01T00:36:50.000Z");
        assert_eq!(t.minutes_seconds(), "36:50");
    }

    #[test]
    fn overflowing_minutes_roll_into_hours() {
        let t = LapTime::parse("75:05");
        assert_eq!(t.iso(), "1970-01-01T01:15:05.000Z");
    }

    #[test]
    fn malformed_time_is_invalid_not_error() {
        assert_eq!(LapTime::parse("3650"), LapTime::Invalid);
        assert_eq!(LapTime::parse("ab:cd"), LapTime::Invalid);
        assert_eq!(LapTime::parse(""), LapTime::Invalid);
        assert_eq!(LapTime::Invalid.iso(), "Invalid Date");
    }

    #[test]
    fn deserializes_upstream_shape() {
        let json = r#"{"Time":"36:50","Place":1,"Seconds":2210,"Name":"Marco Pantani",
            "Year":1995,"Nationality":"ITA",
            "Doping":"Alleged drug use during 1995 due to high hematocrit levels",
            "URL":"https://en.wikipedia.org/wiki/Marco_Pantani#Alleged_drug_use"}"#;
        let raw: RawRecord = serde_json::from_str(json).unwrap();
        let rec = Record::from(raw);
        assert_eq!(rec.year, 1995);
        assert_eq!(rec.seconds, Some(2210));
        assert_eq!(rec.time.epoch_ms(), Some(2_210_000));
        assert!(rec.has_doping_allegation());
    }

    #[test]
    fn extents_skip_invalid_times() {
        let records = vec![
            record("39:15", 2006, ""),
            record("bad", 1990, ""),
            record("36:50", 1995, "x"),
        ];
        assert_eq!(year_extent(&records), Some((1990, 2006)));
        let (lo, hi) = time_extent(&records).unwrap();
        assert_eq!(LapTime::At(lo).minutes_seconds(), "36:50");
        assert_eq!(LapTime::At(hi).minutes_seconds(), "39:15");
    }

    #[test]
    fn extents_of_empty_are_none() {
        assert_eq!(year_extent(&[]), None);
        assert_eq!(time_extent(&[]), None);
    }
}
