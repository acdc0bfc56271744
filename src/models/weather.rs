use chrono::{ DateTime, Utc };
use serde::de::{ self, Deserializer, Visitor };
use serde::{ Deserialize, Serialize, Serializer };
use std::fmt;

pub const UNAVAILABLE: &str = "Unavailable";

/// A measurement that may be missing. Missing values go over the wire as the
/// literal string `"Unavailable"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Unavailable,
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Value(_))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{}", v),
            Reading::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_f64(*v),
            Reading::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

struct ReadingVisitor;

impl<'de> Visitor<'de> for ReadingVisitor {
    type Value = Reading;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a number or the string \"{}\"", UNAVAILABLE)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Reading, E> {
        Ok(Reading::Value(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Reading, E> {
        Ok(Reading::Value(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Reading, E> {
        Ok(Reading::Value(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Reading, E> {
        if v == UNAVAILABLE {
            Ok(Reading::Unavailable)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ReadingVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const NEW_YORK: Coordinates = Coordinates { latitude: 40.7128, longitude: -74.006 };
}

/// One point-in-time weather reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub time: DateTime<Utc>,
    #[serde(rename = "temp")]
    pub temperature: Reading,
    #[serde(rename = "wind")]
    pub wind_speed: Reading,
    pub location: String,
}

impl WeatherSnapshot {
    pub fn new(location: impl Into<String>, temperature: f64, wind_speed: f64) -> Self {
        Self {
            time: Utc::now(),
            temperature: Reading::Value(temperature),
            wind_speed: Reading::Value(wind_speed),
            location: location.into(),
        }
    }

    /// Placeholder used when the upstream could not be reached.
    pub fn unavailable(location: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            temperature: Reading::Unavailable,
            wind_speed: Reading::Unavailable,
            location: location.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !self.temperature.is_available() && !self.wind_speed.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_serializes_sentinel_strings() {
        let snapshot = WeatherSnapshot::unavailable("New York City, NY");
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["temp"], json!("Unavailable"));
        assert_eq!(value["wind"], json!("Unavailable"));
        assert_eq!(value["location"], json!("New York City, NY"));
        assert!(value["time"].is_string());
    }

    #[test]
    fn live_snapshot_serializes_numbers() {
        let snapshot = WeatherSnapshot::new("Here", 21.5, 7.0);
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["temp"], json!(21.5));
        assert_eq!(value["wind"], json!(7.0));
        assert!(!snapshot.is_placeholder());
    }

    #[test]
    fn reading_parses_both_shapes() {
        let r: Reading = serde_json::from_str("3").unwrap();
        assert_eq!(r, Reading::Value(3.0));
        let r: Reading = serde_json::from_str("\"Unavailable\"").unwrap();
        assert_eq!(r, Reading::Unavailable);
        assert!(serde_json::from_str::<Reading>("\"n/a\"").is_err());
    }

    #[test]
    fn reading_display_drops_trailing_zero() {
        assert_eq!(Reading::Value(12.0).to_string(), "12");
        assert_eq!(Reading::Value(-3.4).to_string(), "-3.4");
        assert_eq!(Reading::Unavailable.to_string(), "Unavailable");
    }
}
