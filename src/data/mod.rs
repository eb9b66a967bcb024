//! Core data models for smnview
//!
//! This module contains the station reading as published by the SMN feed and
//! the envelope that wraps every fetch attempt before it is cached.

pub mod smn;

pub use smn::{summary, FetchError, SmnClient, WeatherSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Label used for readings that carry no province
pub const UNSPECIFIED_PROVINCE: &str = "Unspecified";

/// One weather station's observation record
///
/// Readings are identified only by their position in the feed. Every field is
/// optional; members this struct does not model are kept in `extra` so a
/// cached reading serializes back with the full payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Station / city name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Province the station belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Current conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<StationWeather>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Conditions reported by a station
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationWeather {
    /// Temperature in Celsius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// Relative humidity percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Wind speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    /// Wind direction; the feed spells this key `wing_deg`
    #[serde(default, alias = "wing_deg", skip_serializing_if = "Option::is_none")]
    pub wind_deg: Option<WindDirection>,
    /// Sky description, e.g. "Parcialmente nublado"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "Feels like" description
    #[serde(default, alias = "tempDesc", skip_serializing_if = "Option::is_none")]
    pub temp_desc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wind direction as either a bearing or a compass label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindDirection {
    Degrees(f64),
    Label(String),
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindDirection::Degrees(deg) => write!(f, "{}°", deg),
            WindDirection::Label(label) => f.write_str(label),
        }
    }
}

impl WeatherReading {
    /// Province used for filtering and grouping; blank or missing provinces
    /// map to [`UNSPECIFIED_PROVINCE`]
    pub fn province_label(&self) -> &str {
        match self.province.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => UNSPECIFIED_PROVINCE,
        }
    }

    /// Station name, empty when missing
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Outcome of one fetch attempt, persisted wholesale to the cache file
///
/// `data` is present exactly when `success` is true and `error` exactly when
/// it is false. The constructors are the only way to build one, which keeps
/// that pairing intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Vec<WeatherReading>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// When the attempt finished
    pub timestamp: DateTime<Utc>,
    /// URL that was queried
    pub source: String,
}

impl FetchEnvelope {
    pub fn success(readings: Vec<WeatherReading>, source: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(readings),
            error: None,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    pub fn failure(error: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    /// The readings of a successful fetch
    pub fn readings(&self) -> Option<&[WeatherReading]> {
        if self.success {
            self.data.as_deref()
        } else {
            None
        }
    }

    /// The error message of a failed fetch
    pub fn error(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            self.error.as_deref()
        }
    }
}
