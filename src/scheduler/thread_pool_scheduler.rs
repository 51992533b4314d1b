use std::sync::Arc;

use futures::{executor::ThreadPool, future};
use once_cell::sync::Lazy;

use super::{Action, ArcCancellable, CancelToken, Canceller, Scheduler};

static DEFAULT_POOL: Lazy<Option<ThreadPool>> = Lazy::new(|| match ThreadPool::new() {
  Ok(pool) => Some(pool),
  Err(err) => {
    log::error!("failed to build the shared thread pool: {err}");
    None
  }
});

/// Runs actions on a `futures` thread pool.
///
/// Production loops park their thread while they wait for demand, so a pool
/// can host at most as many concurrently waiting subscriptions as it has
/// threads. Prefer [`ThreadScheduler`](super::ThreadScheduler) for long-lived
/// subscriptions.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: Option<ThreadPool>,
}

impl ThreadPoolScheduler {
  /// Uses the lazily built process-wide pool.
  pub fn shared() -> Self { Self { pool: DEFAULT_POOL.clone() } }

  pub fn with_pool(pool: ThreadPool) -> Self { Self { pool: Some(pool) } }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, action: Action) -> ArcCancellable {
    let token = Arc::new(CancelToken::new());
    let c_token = token.clone();
    let run = move || {
      if !c_token.is_cancelled() {
        action(c_token)
      }
    };
    match &self.pool {
      Some(pool) => pool.spawn_ok(future::lazy(move |_| run())),
      None => run(),
    }
    token
  }
}
