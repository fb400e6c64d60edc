//! The time tracking model: sessions, the project and client registries, the session timer and
//! the summaries computed from them. Nothing here does I/O.

pub mod aggregate;
pub mod entities;
pub mod registry;
pub mod timer;
