use std::sync::Arc;

use super::{spawn_source, ScalarCallable};
use crate::{scheduler::ArcScheduler, subscriber::ArcSubscriber, subscription::ArcSubscription};

/// Waits for the first unit of demand, reads the callable, then emits its
/// value, if any, and completes.
pub(crate) fn produce<T: Send + 'static>(
  callable: Arc<dyn ScalarCallable<T>>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription {
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| {
    if !demand.acquire() {
      return;
    }
    if let Some(item) = callable.try_get() {
      c_subscriber.on_next(item);
    }
    if !demand.is_cancelled() {
      c_subscriber.on_complete();
    }
  })
}
