//! `HH:MM` wire format for optional times of day.

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serializer};

pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw, "%H:%M").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
}

pub mod hh_mm_option {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wakeup {
        #[serde(default, with = "hh_mm_option")]
        at: Option<NaiveTime>,
    }

    #[test]
    fn accepts_minutes_and_seconds() {
        let w: Wakeup = serde_json::from_str(r#"{"at":"05:30"}"#).unwrap();
        assert_eq!(w.at, NaiveTime::from_hms_opt(5, 30, 0));
        let w: Wakeup = serde_json::from_str(r#"{"at":"05:30:00"}"#).unwrap();
        assert_eq!(w.at, NaiveTime::from_hms_opt(5, 30, 0));
    }

    #[test]
    fn blank_or_missing_is_none() {
        let w: Wakeup = serde_json::from_str(r#"{"at":""}"#).unwrap();
        assert_eq!(w.at, None);
        let w: Wakeup = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(w.at, None);
    }

    #[test]
    fn serializes_as_hh_mm() {
        let w = Wakeup {
            at: NaiveTime::from_hms_opt(6, 5, 0),
        };
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"at":"06:05"}"#);
        assert!(serde_json::from_str::<Wakeup>(r#"{"at":"25:99"}"#).is_err());
    }
}
