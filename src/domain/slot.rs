//! Slot - Time-of-day Values and Bookable Slots

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A time of day with minute precision, rendered as "HH:MM"
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime {
    hour: u8,
    minute: u8,
}

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime { hour: 0, minute: 0 };

    /// Create a new time; hour must be < 24 and minute < 60
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(Error::invalid(format!("time out of range: {hour}:{minute}")));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Build from minutes since midnight
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        Self::new(minutes / 60, minutes % 60)
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// Minutes since midnight
    pub fn minutes(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for SlotTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((h, m)) = s.trim().split_once(':') else {
            return Err(Error::invalid(format!("expected HH:MM, got {s:?}")));
        };
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| Error::invalid(format!("expected HH:MM, got {s:?}")))
        };
        Self::new(parse(h)?, parse(m)?)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for SlotTime {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "SlotTime".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "pattern": "^[0-2][0-9]:[0-5][0-9]$"
        })
    }
}

/// A candidate appointment time on a given date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeSlot {
    pub time: SlotTime,
    pub available: bool,
}

impl TimeSlot {
    pub fn new(time: SlotTime, available: bool) -> Self {
        Self { time, available }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let t: SlotTime = "10:30".parse().expect("parse");
        assert_eq!(t.hour(), 10);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.to_string(), "10:30");
        assert_eq!(SlotTime::new(9, 0).expect("time").to_string(), "09:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1030".parse::<SlotTime>().is_err());
        assert!("25:00".parse::<SlotTime>().is_err());
        assert!("10:61".parse::<SlotTime>().is_err());
        assert!("ab:cd".parse::<SlotTime>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let slot = TimeSlot::new("14:00".parse().expect("parse"), true);
        let json = serde_json::to_string(&slot).expect("serialize");
        assert_eq!(json, r#"{"time":"14:00","available":true}"#);
        let back: TimeSlot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, slot);
    }
}
