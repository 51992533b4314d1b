//! Blocking bridges: subscribe, then park the calling thread until the
//! outcome arrives.

use std::{
  sync::{
    mpsc::{sync_channel, Receiver, SyncSender},
    Arc, Mutex,
  },
  time::Duration,
};

use once_cell::sync::OnceCell;

use crate::{
  error::{Error, Result},
  publisher::Producer,
  subscriber::Subscriber,
  subscription::{ArcSubscription, UNBOUNDED},
  util::{lock, take_once},
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pick {
  /// Requests one item and settles on it.
  First,
  /// Requests everything and settles on the most recent item at completion.
  Last,
}

impl<T: Send + 'static> Producer<T> {
  /// Waits for one outcome: `Ok(Some)` for an item, `Ok(None)` for an empty
  /// completion, `Err` for an error or a missed deadline.
  pub(crate) fn block(&self, pick: Pick, timeout: Option<Duration>) -> Result<Option<T>> {
    let (tx, rx) = sync_channel(1);
    let subscriber = Arc::new(BlockingSubscriber {
      pick,
      outcome: Mutex::new(Some(tx)),
      last: Mutex::new(None),
      subscription: OnceCell::new(),
    });
    let subscription = self.produce(subscriber.clone(), None);
    let outcome = wait(&rx, timeout);
    if outcome.is_none() {
      subscription.cancel();
    }
    drop(subscriber);
    outcome.unwrap_or(Err(Error::Timeout))
  }
}

/// `None` when the deadline passed. The caller holds the subscriber, so the
/// sender outlives the wait.
fn wait<T>(
  rx: &Receiver<Result<Option<T>>>,
  timeout: Option<Duration>,
) -> Option<Result<Option<T>>> {
  match timeout {
    Some(timeout) => rx.recv_timeout(timeout).ok(),
    None => rx.recv().ok(),
  }
}

struct BlockingSubscriber<T> {
  pick: Pick,
  outcome: Mutex<Option<SyncSender<Result<Option<T>>>>>,
  last: Mutex<Option<T>>,
  subscription: OnceCell<ArcSubscription>,
}

impl<T> BlockingSubscriber<T> {
  /// Only the first outcome gets through.
  fn settle(&self, outcome: Result<Option<T>>) {
    if let Some(tx) = take_once(&self.outcome) {
      let _ = tx.send(outcome);
    }
  }
}

impl<T: Send> Subscriber<T> for BlockingSubscriber<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    if self.subscription.set(subscription.clone()).is_ok() {
      subscription.request(if self.pick == Pick::First { 1 } else { UNBOUNDED });
    }
  }

  fn on_next(&self, item: T) {
    match self.pick {
      Pick::First => {
        if let Some(s) = self.subscription.get() {
          s.cancel();
        }
        self.settle(Ok(Some(item)));
      }
      Pick::Last => *lock(&self.last) = Some(item),
    }
  }

  fn on_complete(&self) { self.settle(Ok(take_once(&self.last))) }

  fn on_error(&self, err: Error) { self.settle(Err(err)) }
}
