//! Terminal time tracker. A timer counts the seconds spent on a task, each stop turns them into a
//! labelled session, and sessions are summarized per day, week, project and client.
//!
//! [domain] holds the model and the pure computations, [app] the controller owning the state,
//! [storage] the persistence and [cli] the terminal front end.

pub mod app;
pub mod cli;
pub mod domain;
pub mod storage;
pub mod utils;
