//! Shared helpers for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::data::{FetchEnvelope, WeatherReading, WeatherSource};

pub const STUB_SOURCE: &str = "http://stub.test/map_items/weather";

/// Source returning a fixed envelope and counting calls
pub struct StubSource {
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub fn ok() -> Self {
        Self {
            succeed: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::ok()
        }
    }

    /// Shared call counter, readable after the source has been moved
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl WeatherSource for StubSource {
    async fn fetch(&self) -> FetchEnvelope {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            FetchEnvelope::success(stub_readings(), STUB_SOURCE)
        } else {
            FetchEnvelope::failure("stub failure", STUB_SOURCE)
        }
    }
}

pub fn stub_readings() -> Vec<WeatherReading> {
    vec![WeatherReading {
        name: Some("La Quiaca".to_string()),
        province: Some("Jujuy".to_string()),
        ..Default::default()
    }]
}
