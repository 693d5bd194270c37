//! tickshare - one shared clock for many countdowns
//!
//! A [`store::ClockStore`] holds the current epoch second and is refreshed by a
//! single periodic driver ([`ticker`]). Countdown displays read the shared value
//! instead of running timers of their own.

pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod store;
pub mod ticker;

// Re-exports for ergonomics
pub use clock::{Clock, ClockError, ManualClock, SystemClock};
pub use store::{ClockStore, NowReader, NowSubscription};
