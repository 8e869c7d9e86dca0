//! Per-invocation engine state
//!
//! A fresh [`RunState`] is created for every run and threaded explicitly through
//! the dork processor, batch scheduler and worker pool, so two runs never share
//! a visited set or batch counter.

mod run_state;

pub use run_state::{RunState, VisitedSet};
