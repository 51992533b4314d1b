use std::sync::Arc;

use super::{spawn_source, Producer};
use crate::{
  error::Error,
  scheduler::ArcScheduler,
  subscriber::ArcSubscriber,
  subscription::{ArcSubscription, NoopSubscription},
};

impl<T: Send + 'static> Producer<T> {
  /// Scalar-tagged, so fused operators see an empty value synchronously.
  pub(crate) fn empty() -> Self {
    Producer { produce: Arc::new(empty::<T>), scalar: Some(Arc::new(|| None::<T>)) }
  }

  pub(crate) fn error(err: Error) -> Self {
    Producer::new(move |subscriber, scheduler| error(err.clone(), subscriber, scheduler))
  }

  pub(crate) fn never() -> Self { Producer::new(|subscriber, _| never(subscriber)) }
}

/// Completes without waiting for demand.
pub(crate) fn empty<T: Send + 'static>(
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription {
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| {
    if !demand.is_cancelled() {
      c_subscriber.on_complete();
    }
  })
}

/// Signals `err` without waiting for demand.
pub(crate) fn error<T: Send + 'static>(
  err: Error,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription {
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| {
    if !demand.is_cancelled() {
      c_subscriber.on_error(err);
    }
  })
}

/// Never signals anything past `on_subscribe`.
pub(crate) fn never<T>(subscriber: ArcSubscriber<T>) -> ArcSubscription {
  let subscription: ArcSubscription = Arc::new(NoopSubscription);
  subscriber.on_subscribe(subscription.clone());
  subscription
}
