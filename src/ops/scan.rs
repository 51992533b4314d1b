use std::sync::{Arc, Mutex};

use super::reduce::Accumulator;
use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error, publisher::Producer, subscriber::Subscriber, subscription::ArcSubscription,
  util::lock,
};

impl<T: Clone + Send + 'static> Producer<T> {
  /// Like `reduce`, but emits the running accumulator after every item. The
  /// first item passes through as the seed.
  pub(crate) fn scan(&self, accumulator: Accumulator<T>) -> Producer<T> {
    self.lift(move || {
      Arc::new(ScanProcessor {
        stage: Stage::default(),
        accumulator: accumulator.clone(),
        acc: Mutex::new(None),
      })
    })
  }
}

pub(crate) struct ScanProcessor<T> {
  stage: Stage<T>,
  accumulator: Accumulator<T>,
  acc: Mutex<Option<T>>,
}

impl<T: Clone + Send + 'static> Subscriber<T> for ScanProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    let current = {
      let mut acc = lock(&self.acc);
      let next = match acc.take() {
        Some(prev) => (self.accumulator)(prev, item),
        None => item,
      };
      *acc = Some(next.clone());
      next
    };
    self.stage.next(current)
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl_passthrough_subscription!([T: Clone + Send + 'static] ScanProcessor<T>);
impl_processor!([T: Clone + Send + 'static] ScanProcessor<T>, T => T);
