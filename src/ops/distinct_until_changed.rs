//! DistinctUntilChanged operator
//!
//! Suppresses an item equal to the item emitted right before it. Only
//! adjacent items are compared, so `[1, 2, 1]` passes unchanged.

use std::sync::{Arc, Mutex};

use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::{ConditionalSubscriber, Subscriber},
  subscription::ArcSubscription,
  util::lock,
};

impl<T: PartialEq + Clone + Send + 'static> Producer<T> {
  pub(crate) fn distinct_until_changed(&self) -> Producer<T> {
    if self.scalar().is_some() {
      return self.clone();
    }
    self.lift(|| {
      Arc::new(DistinctUntilChangedProcessor { stage: Stage::default(), last: Mutex::new(None) })
    })
  }
}

pub(crate) struct DistinctUntilChangedProcessor<T> {
  stage: Stage<T>,
  last: Mutex<Option<T>>,
}

impl<T: PartialEq + Clone> DistinctUntilChangedProcessor<T> {
  /// Records `item` as the latest unless it repeats the previous one.
  fn is_new(&self, item: &T) -> bool {
    let mut last = lock(&self.last);
    if last.as_ref() == Some(item) {
      false
    } else {
      *last = Some(item.clone());
      true
    }
  }
}

impl<T: PartialEq + Clone + Send + 'static> Subscriber<T> for DistinctUntilChangedProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    if self.is_new(&item) {
      self.stage.next(item)
    } else {
      self.stage.request_upstream(1)
    }
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }

  fn conditional(self: Arc<Self>) -> Option<Arc<dyn ConditionalSubscriber<T>>> { Some(self) }
}

impl<T: PartialEq + Clone + Send + 'static> ConditionalSubscriber<T>
  for DistinctUntilChangedProcessor<T>
{
  fn on_next_if(&self, item: T) -> bool {
    let fresh = self.is_new(&item);
    if fresh {
      self.stage.next(item);
    }
    fresh
  }
}

impl_passthrough_subscription!(
  [T: PartialEq + Clone + Send + 'static] DistinctUntilChangedProcessor<T>
);
impl_processor!(
  [T: PartialEq + Clone + Send + 'static] DistinctUntilChangedProcessor<T>, T => T
);
