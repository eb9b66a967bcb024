//! Presentation transforms
//!
//! Turns cached readings into what a screen shows: filtered, grouped by
//! province in Spanish collation order, and formatted into cards. Nothing here
//! knows about terminals or HTML.

pub mod card;
pub mod collate;
pub mod filter;

pub use card::{highlight, Card, Freshness, Segment};
pub use filter::{
    filter, group_by_province, no_results_message, provinces, Dashboard, Filters,
    ProvinceGroup, Stats,
};
