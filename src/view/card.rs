//! Display strings for a single station card

use chrono::{DateTime, Utc};

use crate::data::WeatherReading;

/// Minutes under which data is shown as fresh
const FRESH_MINUTES: i64 = 30;

/// Formatted values of one reading, with fallbacks for missing data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub feels_like: String,
    pub description: String,
}

impl Card {
    pub fn from_reading(reading: &WeatherReading) -> Self {
        let weather = reading.weather.as_ref();
        let number = |value: Option<f64>, unit: &str| {
            value.map_or_else(|| "N/A".to_string(), |v| format!("{}{}", v, unit))
        };

        Self {
            name: reading
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed station".to_string()),
            temperature: number(weather.and_then(|w| w.temp), "°C"),
            humidity: number(weather.and_then(|w| w.humidity), "%"),
            wind_speed: number(weather.and_then(|w| w.wind_speed), " km/h"),
            wind_direction: weather
                .and_then(|w| w.wind_deg.as_ref())
                .map_or_else(|| "N/A".to_string(), ToString::to_string),
            feels_like: weather
                .and_then(|w| w.temp_desc.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            description: weather
                .and_then(|w| w.description.clone())
                .unwrap_or_else(|| "No description".to_string()),
        }
    }
}

/// A piece of a station name, marked when it matches the search text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Splits `name` around every case-insensitive occurrence of `search`
///
/// Names whose characters do not lowercase one-to-one are returned as a single
/// unmatched segment.
pub fn highlight(name: &str, search: &str) -> Vec<Segment> {
    let whole = || {
        vec![Segment {
            text: name.to_string(),
            matched: false,
        }]
    };

    let needle: Vec<char> = search.trim().to_lowercase().chars().collect();
    if needle.is_empty() || name.is_empty() {
        return whole();
    }

    let original: Vec<char> = name.chars().collect();
    let lowered: Option<Vec<char>> = original
        .iter()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => Some(l),
                _ => None,
            }
        })
        .collect();
    let Some(lowered) = lowered else {
        return whole();
    };

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i + needle.len() <= lowered.len() {
        if lowered[i..i + needle.len()] == needle[..] {
            if plain_start < i {
                segments.push(Segment {
                    text: original[plain_start..i].iter().collect(),
                    matched: false,
                });
            }
            segments.push(Segment {
                text: original[i..i + needle.len()].iter().collect(),
                matched: true,
            });
            i += needle.len();
            plain_start = i;
        } else {
            i += 1;
        }
    }
    if plain_start < original.len() {
        segments.push(Segment {
            text: original[plain_start..].iter().collect(),
            matched: false,
        });
    }
    segments
}

/// How recent the cached data is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Freshness {
    /// e.g. "5 minutes ago"
    pub label: String,
    /// Under thirty minutes old
    pub fresh: bool,
}

impl Freshness {
    pub fn since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let minutes = (now - timestamp).num_minutes();
        let hours = minutes / 60;

        let (label, fresh) = if minutes < 1 {
            ("less than a minute ago".to_string(), true)
        } else if minutes < 60 {
            (plural(minutes, "minute"), minutes <= FRESH_MINUTES)
        } else if hours < 24 {
            (plural(hours, "hour"), false)
        } else {
            (plural(hours / 24, "day"), false)
        };

        Self { label, fresh }
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
