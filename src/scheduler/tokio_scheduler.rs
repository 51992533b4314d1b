use std::sync::Arc;

use tokio::runtime::Handle;

use super::{Action, ArcCancellable, CancelToken, Canceller, Scheduler};

/// Runs actions on a tokio runtime's blocking pool, since production loops
/// park while waiting for demand.
#[derive(Clone)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { Self { handle } }

  /// Uses the runtime the caller currently runs inside, if any.
  pub fn current() -> Option<Self> { Handle::try_current().ok().map(Self::new) }
}

impl Scheduler for TokioScheduler {
  fn schedule(&self, action: Action) -> ArcCancellable {
    let token = Arc::new(CancelToken::new());
    let c_token = token.clone();
    self.handle.spawn_blocking(move || {
      if !c_token.is_cancelled() {
        action(c_token)
      }
    });
    token
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[tokio::test(flavor = "multi_thread")]
  async fn runs_on_blocking_pool() {
    let scheduler = TokioScheduler::current().unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    scheduler.schedule(Box::new(move |_| {
      let _ = tx.send(42);
    }));
    let got = rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap();
    assert_eq!(got, 42);
  }
}
