//! Application state for the terminal viewer
//!
//! Holds the loaded envelope, the filter state and the keyboard-driven
//! transitions between them. Rendering lives in `ui`.

use crossterm::event::{KeyCode, KeyEvent};

use crate::cache::EnvelopeStore;
use crate::data::FetchEnvelope;
use crate::view::{provinces, Dashboard, Filters};

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Single-key commands
    #[default]
    Normal,
    /// Typing into the search box
    Search,
}

/// Main application struct managing state and data
pub struct App {
    /// Last successfully loaded envelope
    pub envelope: Option<FetchEnvelope>,
    /// Why the last load failed, shown inline
    pub load_error: Option<String>,
    /// Province labels for the selector, in display order
    pub provinces: Vec<String>,
    /// Active filters
    pub filters: Filters,
    pub input_mode: InputMode,
    /// Raw search text as typed
    pub search_input: String,
    /// Index into `provinces`; `None` shows all
    pub province_index: Option<usize>,
    /// Vertical scroll offset of the station list
    pub scroll: u16,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    store: EnvelopeStore,
}

impl App {
    /// Creates an empty viewer reading from `store`; call [`App::load`] next
    pub fn new(store: EnvelopeStore) -> Self {
        Self {
            envelope: None,
            load_error: None,
            provinces: Vec::new(),
            filters: Filters::default(),
            input_mode: InputMode::Normal,
            search_input: String::new(),
            province_index: None,
            scroll: 0,
            show_help: false,
            should_quit: false,
            store,
        }
    }

    /// Reads the cache file, keeping the current filters
    ///
    /// A selected province that no longer exists falls back to all provinces.
    pub fn load(&mut self) {
        match self.store.read() {
            Ok(envelope) => match envelope.readings() {
                Some(readings) => {
                    self.provinces = provinces(readings);
                    self.load_error = None;
                    self.envelope = Some(envelope);
                }
                None => {
                    self.load_error = Some(
                        envelope
                            .error()
                            .unwrap_or("Cached envelope holds no data")
                            .to_string(),
                    );
                    self.clear_data();
                }
            },
            Err(e) => {
                self.load_error = Some(e.to_string());
                self.clear_data();
            }
        }

        let selected = self.filters.province().to_string();
        self.province_index = self.provinces.iter().position(|p| *p == selected);
        if self.province_index.is_none() {
            self.filters.set_province("");
        }
        self.scroll = 0;
    }

    fn clear_data(&mut self) {
        self.envelope = None;
        self.provinces.clear();
    }

    /// Filtered and grouped view of the loaded data
    pub fn dashboard(&self) -> Option<Dashboard<'_>> {
        let readings = self.envelope.as_ref()?.readings()?;
        Some(Dashboard::build(readings, &self.filters))
    }

    /// Handles a keyboard event
    ///
    /// Key mappings:
    /// - `q`: Quit the application
    /// - `/`: Edit the search text; `Enter` keeps it, `Backspace` deletes
    /// - `Left`/`h`, `Right`/`l`: Cycle the province filter
    /// - `Up`/`k`, `Down`/`j`, `g`: Scroll the station list
    /// - `c`: Clear both filters
    /// - `Esc`: Clear both filters (also leaves search editing)
    /// - `r`: Reload the cache file
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.input_mode {
            InputMode::Search => match key_event.code {
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    self.clear_filters();
                }
                KeyCode::Enter => {
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.apply_search();
                }
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.apply_search();
                }
                _ => {}
            },
            InputMode::Normal => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Search;
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.next_province();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.previous_province();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll = self.scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll = self.scroll.saturating_sub(1);
                }
                KeyCode::Char('g') => {
                    self.scroll = 0;
                }
                KeyCode::Char('c') | KeyCode::Esc => {
                    self.clear_filters();
                }
                KeyCode::Char('r') => {
                    self.load();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn apply_search(&mut self) {
        self.filters.set_search(&self.search_input);
        self.scroll = 0;
    }

    fn clear_filters(&mut self) {
        self.filters.clear();
        self.search_input.clear();
        self.province_index = None;
        self.scroll = 0;
    }

    /// All → first → ... → last → All
    fn next_province(&mut self) {
        if self.provinces.is_empty() {
            return;
        }
        self.province_index = match self.province_index {
            None => Some(0),
            Some(i) if i + 1 < self.provinces.len() => Some(i + 1),
            Some(_) => None,
        };
        self.apply_province();
    }

    fn previous_province(&mut self) {
        if self.provinces.is_empty() {
            return;
        }
        self.province_index = match self.province_index {
            None => Some(self.provinces.len() - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        self.apply_province();
    }

    fn apply_province(&mut self) {
        let province = self
            .province_index
            .and_then(|i| self.provinces.get(i))
            .cloned()
            .unwrap_or_default();
        self.filters.set_province(province);
        self.scroll = 0;
    }
}
