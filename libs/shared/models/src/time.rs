//! Serde helpers for clinic wall-clock times.
//!
//! Times go out as `HH:MM`. Incoming values may be `HH:MM` or `HH:MM:SS`
//! (Postgres `time` columns come back with seconds).

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .ok()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub mod hhmm {
    use super::*;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_time(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw))
        })
    }
}
