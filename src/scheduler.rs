use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use crate::util::lock;

mod thread_scheduler;
pub use thread_scheduler::{ThreadScheduler, ThreadSchedulerConfig};

#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// The cancellation view a scheduled action receives.
///
/// Looping actions must check `is_cancelled` between items at the least.
pub trait Canceller: Send + Sync {
  fn is_cancelled(&self) -> bool;

  /// Registers `callback` to run inside `cancel()`. Runs it right away if the
  /// action is already cancelled.
  fn on_cancel(&self, callback: Box<dyn FnOnce() + Send>);
}

/// The handle returned by [`Scheduler::schedule`].
pub trait Cancellable: Send + Sync {
  fn cancel(&self);
}

pub type ArcCanceller = Arc<dyn Canceller>;
pub type ArcCancellable = Arc<dyn Cancellable>;
pub type Action = Box<dyn FnOnce(ArcCanceller) + Send>;

/// Executes cancellable units of work.
pub trait Scheduler: Send + Sync {
  fn schedule(&self, action: Action) -> ArcCancellable;
}

pub type ArcScheduler = Arc<dyn Scheduler>;

/// Returns the default scheduler: a fresh worker thread consuming a bounded
/// queue.
pub fn new_thread() -> ArcScheduler { Arc::new(ThreadScheduler::new()) }

pub(crate) fn or_default(scheduler: Option<ArcScheduler>) -> ArcScheduler {
  scheduler.unwrap_or_else(new_thread)
}

type Callback = Box<dyn FnOnce() + Send>;

/// The private cancellation flag of one scheduled action. Serves as both its
/// [`Canceller`] and its [`Cancellable`].
#[derive(Default)]
pub struct CancelToken {
  state: Mutex<TokenState>,
}

#[derive(Default)]
struct TokenState {
  cancelled: bool,
  callbacks: SmallVec<[Callback; 1]>,
}

impl CancelToken {
  pub fn new() -> Self { Self::default() }
}

impl Canceller for CancelToken {
  fn is_cancelled(&self) -> bool { lock(&self.state).cancelled }

  fn on_cancel(&self, callback: Box<dyn FnOnce() + Send>) {
    {
      let mut state = lock(&self.state);
      if !state.cancelled {
        state.callbacks.push(callback);
        return;
      }
    }
    callback()
  }
}

impl Cancellable for CancelToken {
  fn cancel(&self) {
    let callbacks = {
      let mut state = lock(&self.state);
      if state.cancelled {
        return;
      }
      state.cancelled = true;
      std::mem::take(&mut state.callbacks)
    };
    callbacks.into_iter().for_each(|f| f());
  }
}
