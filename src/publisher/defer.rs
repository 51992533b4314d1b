use std::sync::Arc;

use super::Publisher;
use crate::{
  error::Error,
  scheduler::{or_default, ArcScheduler},
  subscriber::{ArcSubscriber, ConditionalSubscriber, Subscriber},
  subscription::{ArcSubscription, ProxySubscription},
};

/// Builds the publisher on the scheduler at subscription time and subscribes
/// the downstream to it.
///
/// The downstream gets a proxy subscription up front; the real one is
/// installed when the deferred publisher subscribes, replaying any demand or
/// cancellation recorded meanwhile.
pub(crate) fn produce<T, P>(
  supplier: Arc<dyn Fn() -> P + Send + Sync>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription
where
  T: Send + 'static,
  P: Publisher<T> + 'static,
{
  let proxy = Arc::new(ProxySubscription::new());
  subscriber.on_subscribe(proxy.clone());
  let forward = Arc::new(Forward::new(subscriber, proxy.clone()));
  let c_proxy = proxy.clone();
  or_default(scheduler.clone()).schedule(Box::new(move |canceller| {
    if canceller.is_cancelled() || c_proxy.is_cancelled() {
      return;
    }
    supplier().subscribe_on(forward, scheduler);
  }));
  proxy
}

/// Passes signals through to `inner`, except `on_subscribe`, which installs
/// the subscription into the proxy `inner` already holds.
pub(crate) struct Forward<T> {
  inner: ArcSubscriber<T>,
  proxy: Arc<ProxySubscription>,
}

impl<T> Forward<T> {
  pub(crate) fn new(inner: ArcSubscriber<T>, proxy: Arc<ProxySubscription>) -> Self {
    Self { inner, proxy }
  }
}

impl<T: Send + 'static> Subscriber<T> for Forward<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.proxy.set(subscription) }

  fn on_next(&self, item: T) { self.inner.on_next(item) }

  fn on_complete(&self) { self.inner.on_complete() }

  fn on_error(&self, err: Error) { self.inner.on_error(err) }

  fn conditional(self: Arc<Self>) -> Option<Arc<dyn ConditionalSubscriber<T>>> {
    self.inner.clone().conditional()
  }
}
