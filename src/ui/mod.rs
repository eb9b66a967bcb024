//! Terminal rendering for the station viewer, built on ratatui

pub mod help_overlay;
pub mod station_list;

pub use help_overlay::render as render_help_overlay;
pub use station_list::render_station_list;
