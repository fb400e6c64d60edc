//! Persistence of the application collections.
//!  - Every collection is stored under its own [key_value::StoreKey].
//!  - [key_value::JsonFileStore] keeps one JSON document per key in the data directory.
//!  - Reads never fail: missing or corrupted documents load as a fallback value.

pub mod key_value;
