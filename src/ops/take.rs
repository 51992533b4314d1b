use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc,
};

use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error, publisher::Producer, subscriber::Subscriber, subscription::ArcSubscription,
};

impl<T: Send + 'static> Producer<T> {
  /// `take(0)` never subscribes upstream.
  pub(crate) fn take(&self, count: u64) -> Producer<T> {
    if count == 0 {
      return Producer::empty();
    }
    if self.scalar().is_some() {
      return self.clone();
    }
    self.lift(move || {
      Arc::new(TakeProcessor { stage: Stage::default(), limit: count, taken: AtomicU64::new(0) })
    })
  }
}

pub(crate) struct TakeProcessor<T> {
  stage: Stage<T>,
  limit: u64,
  taken: AtomicU64,
}

impl<T: Send + 'static> Subscriber<T> for TakeProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    let taken = self.taken.fetch_add(1, Ordering::SeqCst) + 1;
    if taken > self.limit {
      return;
    }
    self.stage.next(item);
    if taken == self.limit {
      self.stage.cancel_upstream();
      self.stage.complete();
    }
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl_passthrough_subscription!([T: Send + 'static] TakeProcessor<T>);
impl_processor!([T: Send + 'static] TakeProcessor<T>, T => T);
