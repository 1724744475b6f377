//! Shared coordination state and the Coordinator/Aggregator pair that drive
//! it.
//!
//! - [`command_log`] — the Command Log and its id-bearing
//!   [`command_log::LoggedCommand`] entries.
//! - [`replies`] — the per-command Reply Buffer.
//! - [`state`] — everything the single coordination mutex guards.
//! - [`engine`] — the `Arc`-backed handle every Slave Worker and the
//!   Coordinator share: mutex, condition variables, and the operations
//!   defined on top of them.
//! - [`aggregator`] — the pure move-selection fold.
//! - [`coordinator`] — the upstream-facing `notify`/`genmove`/
//!   `dead_group_list`/`chat` surface.

mod aggregator;
mod command_log;
mod coordinator;
mod engine;
mod replies;
mod state;

pub use aggregator::{AggregateResult, Aggregator};
pub use command_log::{is_gamestart, CommandLog, LoggedCommand};
pub use coordinator::{Coordinator, GenmoveResult, NotifyOutcome};
pub use engine::Engine;
pub use replies::ReplyBuffer;
pub use state::{LastStats, SharedState};
