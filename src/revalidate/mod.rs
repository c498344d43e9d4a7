//! Periodic liveness checks for stored links.
//!
//! Only `active` links are sampled. A probe answering below 400 keeps the
//! link active and refreshes `last_seen`; anything else (an error status,
//! a transport failure, a timeout) marks it `dead` after a single failure.
//! Dead links are never probed again; only a crawl that rediscovers them
//! brings them back.

pub mod probe;
pub mod scheduler;

pub use probe::ProbeOutcome;
pub use scheduler::{
    RevalidationError, RevalidationScheduler, RunSummary, SchedulerConfig, delay_until_next_tick,
};
