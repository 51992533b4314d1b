use std::sync::Arc;

use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::{ConditionalSubscriber, Subscriber},
  subscription::ArcSubscription,
};

pub(crate) type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Over a scalar the predicate is applied to the single value directly.
  pub(crate) fn filter(&self, predicate: Predicate<T>) -> Producer<T> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::from_scalar(Arc::new(move || scalar.try_get().filter(|v| predicate(v))));
    }
    self.lift(move || {
      Arc::new(FilterProcessor { stage: Stage::default(), predicate: predicate.clone() })
    })
  }
}

pub(crate) struct FilterProcessor<T> {
  stage: Stage<T>,
  predicate: Predicate<T>,
}

impl<T: Send + 'static> Subscriber<T> for FilterProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    if (self.predicate)(&item) {
      self.stage.next(item)
    } else {
      self.stage.request_upstream(1)
    }
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }

  fn conditional(self: Arc<Self>) -> Option<Arc<dyn ConditionalSubscriber<T>>> { Some(self) }
}

impl<T: Send + 'static> ConditionalSubscriber<T> for FilterProcessor<T> {
  fn on_next_if(&self, item: T) -> bool {
    if (self.predicate)(&item) {
      self.stage.next(item);
      true
    } else {
      false
    }
  }
}

impl_passthrough_subscription!([T: Send + 'static] FilterProcessor<T>);
impl_processor!([T: Send + 'static] FilterProcessor<T>, T => T);
