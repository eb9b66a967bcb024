//! Filtering and grouping of station readings
//!
//! Pure transforms shared by the terminal viewer and the web dashboard. Every
//! change of the province selection or the search text re-runs
//! [`Dashboard::build`] from scratch.

use std::collections::{BTreeMap, BTreeSet};

use super::collate;
use crate::data::WeatherReading;

/// The two filter inputs
///
/// The search text is stored trimmed and lowercased, matching how it is
/// compared against station names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    province: String,
    search: String,
}

impl Filters {
    pub fn new(province: impl Into<String>, search: &str) -> Self {
        Self {
            province: province.into(),
            search: normalize_search(search),
        }
    }

    /// Selected province label, empty for all provinces
    pub fn province(&self) -> &str {
        &self.province
    }

    /// Normalized search text, empty when not searching
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_province(&mut self, province: impl Into<String>) {
        self.province = province.into();
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = normalize_search(search);
    }

    /// Resets both filters
    pub fn clear(&mut self) {
        self.province.clear();
        self.search.clear();
    }

    /// Number of filters in effect (0 to 2)
    pub fn active_count(&self) -> usize {
        usize::from(!self.province.is_empty()) + usize::from(!self.search.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }
}

fn normalize_search(search: &str) -> String {
    search.trim().to_lowercase()
}

/// Keeps the readings matching both filters
///
/// A reading matches when `province` is empty or equals its province label,
/// and `search` is empty or occurs in its lowercased name. The search is
/// trimmed and lowercased before matching; input order is preserved.
pub fn filter<'a>(
    readings: &'a [WeatherReading],
    province: &str,
    search: &str,
) -> Vec<&'a WeatherReading> {
    let search = normalize_search(search);

    readings
        .iter()
        .filter(|r| province.is_empty() || r.province_label() == province)
        .filter(|r| search.is_empty() || r.name_or_empty().to_lowercase().contains(&search))
        .collect()
}

/// Readings belonging to one province
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceGroup<'a> {
    /// Province label, or the unspecified sentinel
    pub province: &'a str,
    /// Stations in input order
    pub stations: Vec<&'a WeatherReading>,
}

/// Partitions readings by province label
///
/// Groups come back in Spanish collation order. Labels that collate equal
/// (e.g. differing only in accents) remain separate groups in code point
/// order.
pub fn group_by_province<'a, I>(readings: I) -> Vec<ProvinceGroup<'a>>
where
    I: IntoIterator<Item = &'a WeatherReading>,
{
    let mut by_province: BTreeMap<&'a str, Vec<&'a WeatherReading>> = BTreeMap::new();
    for reading in readings {
        by_province
            .entry(reading.province_label())
            .or_default()
            .push(reading);
    }

    let mut groups: Vec<ProvinceGroup<'a>> = by_province
        .into_iter()
        .map(|(province, stations)| ProvinceGroup { province, stations })
        .collect();
    groups.sort_by(|a, b| collate::compare(a.province, b.province));
    groups
}

/// Distinct province labels in collation order, for the province selector
pub fn provinces(readings: &[WeatherReading]) -> Vec<String> {
    let unique: BTreeSet<&str> = readings.iter().map(WeatherReading::province_label).collect();
    let mut provinces: Vec<String> = unique.into_iter().map(str::to_string).collect();
    provinces.sort_by(|a, b| collate::compare(a, b));
    provinces
}

/// Counters shown next to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// All stations in the dataset
    pub total_stations: usize,
    /// Provinces with at least one matching station
    pub provinces_shown: usize,
    /// Stations passing the filters
    pub matching_stations: usize,
}

/// Everything a renderer needs for one filter state
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    pub groups: Vec<ProvinceGroup<'a>>,
    pub stats: Stats,
    /// Set when there is nothing to show
    pub message: Option<String>,
}

impl<'a> Dashboard<'a> {
    /// Runs filter, then group, for the given filter state
    pub fn build(readings: &'a [WeatherReading], filters: &Filters) -> Self {
        let matching = filter(readings, filters.province(), filters.search());
        let matching_stations = matching.len();
        let groups = group_by_province(matching);

        let message = if readings.is_empty() {
            Some("No weather data available".to_string())
        } else if matching_stations == 0 {
            Some(no_results_message(filters))
        } else {
            None
        };

        Self {
            stats: Stats {
                total_stations: readings.len(),
                provinces_shown: groups.len(),
                matching_stations,
            },
            groups,
            message,
        }
    }
}

/// Message for an empty result, phrased by which filters are active
pub fn no_results_message(filters: &Filters) -> String {
    match (filters.search(), filters.province()) {
        ("", "") => "No stations match the selected filter".to_string(),
        (search, "") => format!("No cities containing \"{}\"", search),
        ("", province) => format!("No stations in province \"{}\"", province),
        (search, province) => format!(
            "No cities containing \"{}\" in province \"{}\"",
            search, province
        ),
    }
}
