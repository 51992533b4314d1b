//! # reflux: backpressure-aware reactive streams
//!
//! Cold publishers of values with a demand protocol: a subscriber asks for
//! `n` items with [`Subscription::request`] and never receives more than it
//! asked for.
//!
//! ## Quick Start
//!
//! ```rust
//! use reflux::prelude::*;
//!
//! let total = Flux::range(1, 100)
//!   .filter(|v| v % 3 == 0)
//!   .map(|v| v * 2)
//!   .reduce(|a, b| a + b)
//!   .block();
//! assert_eq!(total, Ok(Some(3366)));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Flux`] / [`Mono`] | Publishers of 0..N and 0..1 items |
//! | [`Subscriber`] | Consumes `on_subscribe`, `on_next`, `on_error` and `on_complete` |
//! | [`Subscription`] | Carries demand upstream, or cancels |
//! | [`Scheduler`] | Runs source work: a new thread per subscription by default |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] on a `futures` thread pool
//! - **`tokio-scheduler`**: [`TokioScheduler`] on a tokio runtime
//!
//! [`Flux`]: flux::Flux
//! [`Mono`]: mono::Mono
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`ThreadPoolScheduler`]: prelude::ThreadPoolScheduler
//! [`TokioScheduler`]: prelude::TokioScheduler

mod block;
pub mod error;
pub mod flux;
pub mod mono;
pub mod ops;
pub mod prelude;
pub mod publisher;
pub mod scheduler;
pub mod signal;
pub mod sink;
pub mod subscriber;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_subscriber;
mod util;

pub use prelude::*;
