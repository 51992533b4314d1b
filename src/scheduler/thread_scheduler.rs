use std::{
  sync::{
    mpsc::{sync_channel, SyncSender},
    Arc, Mutex,
  },
  thread,
};

use super::{Action, ArcCancellable, CancelToken, Canceller, Scheduler};
use crate::util::lock;

type Job = (Action, Arc<CancelToken>);

#[derive(Clone, Debug)]
pub struct ThreadSchedulerConfig {
  /// Actions that may wait in the queue before `schedule` blocks the caller.
  pub queue_capacity: usize,
  pub thread_name: String,
}

impl Default for ThreadSchedulerConfig {
  fn default() -> Self { Self { queue_capacity: 10, thread_name: "reflux-worker".to_owned() } }
}

/// One perpetual worker thread consuming a bounded queue of actions.
///
/// The worker lives as long as the scheduler: once the last handle is dropped
/// the queue drains and the thread exits.
pub struct ThreadScheduler {
  tx: Mutex<Option<SyncSender<Job>>>,
}

impl ThreadScheduler {
  pub fn new() -> Self { Self::with_config(ThreadSchedulerConfig::default()) }

  pub fn with_config(config: ThreadSchedulerConfig) -> Self {
    let (tx, rx) = sync_channel::<Job>(config.queue_capacity);
    let spawned = thread::Builder::new().name(config.thread_name).spawn(move || {
      log::trace!("worker started");
      for (action, token) in rx {
        if !token.is_cancelled() {
          action(token);
        }
      }
      log::trace!("worker stopped");
    });
    match spawned {
      Ok(_) => ThreadScheduler { tx: Mutex::new(Some(tx)) },
      Err(err) => {
        log::error!("failed to spawn scheduler worker, running actions inline: {err}");
        ThreadScheduler { tx: Mutex::new(None) }
      }
    }
  }
}

impl Default for ThreadScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for ThreadScheduler {
  fn schedule(&self, action: Action) -> ArcCancellable {
    let token = Arc::new(CancelToken::new());
    let tx = lock(&self.tx).clone();
    match tx {
      Some(tx) => {
        if let Err(rejected) = tx.send((action, token.clone())) {
          let (action, token) = rejected.0;
          action(token);
        }
      }
      None => action(token.clone()),
    }
    token
  }
}
