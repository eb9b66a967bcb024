//! Cache module for the last fetched envelope
//!
//! The whole envelope lives in one JSON file that is replaced wholesale on
//! every successful refresh. Staleness is judged from the file's modification
//! time, and a missing file counts as infinitely stale.

mod store;

pub use store::{default_cache_path, CacheError, EnvelopeStore, CACHE_FILE_NAME};
