use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use super::Publisher;
use crate::{
  error::Error,
  scheduler::ArcScheduler,
  subscriber::{ArcSubscriber, ConditionalSubscriber, Subscriber},
  subscription::{ArcSubscription, Subscription},
  util::take_once,
};

/// Hands the per-subscription resource back to its cleanup exactly once.
struct Release<R> {
  resource: Mutex<Option<R>>,
  cleanup: Arc<dyn Fn(R) + Send + Sync>,
}

impl<R> Release<R> {
  fn run(&self) {
    if let Some(resource) = take_once(&self.resource) {
      (self.cleanup)(resource)
    }
  }
}

/// Acquires a resource, streams the publisher derived from it, and releases
/// the resource after the terminal signal or on cancellation.
pub(crate) fn produce<T, R, P>(
  acquire: &(dyn Fn() -> R + Send + Sync),
  source: &(dyn Fn(&R) -> P + Send + Sync),
  cleanup: Arc<dyn Fn(R) + Send + Sync>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription
where
  T: Send + 'static,
  R: Send + 'static,
  P: Publisher<T>,
{
  let resource = acquire();
  let publisher = source(&resource);
  let release = Arc::new(Release { resource: Mutex::new(Some(resource)), cleanup });
  let wrapper =
    Arc::new(ReleasingSubscriber { inner: subscriber, release, handle: OnceCell::new() });
  let subscription = publisher.subscribe_on(wrapper.clone(), scheduler);
  wrapper.handle(subscription)
}

struct ReleasingSubscriber<T, R> {
  inner: ArcSubscriber<T>,
  release: Arc<Release<R>>,
  /// The one handle downstream sees, whichever side builds it first.
  handle: OnceCell<ArcSubscription>,
}

impl<T, R: Send + 'static> ReleasingSubscriber<T, R> {
  fn handle(&self, inner: ArcSubscription) -> ArcSubscription {
    self
      .handle
      .get_or_init(|| Arc::new(ReleasingSubscription { inner, release: self.release.clone() }))
      .clone()
  }
}

impl<T, R> Subscriber<T> for ReleasingSubscriber<T, R>
where
  T: Send + 'static,
  R: Send + 'static,
{
  fn on_subscribe(&self, subscription: ArcSubscription) {
    self.inner.on_subscribe(self.handle(subscription))
  }

  fn on_next(&self, item: T) { self.inner.on_next(item) }

  fn on_complete(&self) {
    self.inner.on_complete();
    self.release.run();
  }

  fn on_error(&self, err: Error) {
    self.inner.on_error(err);
    self.release.run();
  }

  fn conditional(self: Arc<Self>) -> Option<Arc<dyn ConditionalSubscriber<T>>> {
    self.inner.clone().conditional()
  }
}

struct ReleasingSubscription<R> {
  inner: ArcSubscription,
  release: Arc<Release<R>>,
}

impl<R: Send + 'static> Subscription for ReleasingSubscription<R> {
  fn request(&self, n: u64) { self.inner.request(n) }

  fn cancel(&self) {
    self.inner.cancel();
    self.release.run();
  }
}

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_subscriber::{eventually, Event, TestSubscriber},
  };
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  fn counted(released: &Arc<AtomicUsize>) -> Flux<i32> {
    let c_released = released.clone();
    Flux::using(
      || vec![1, 2, 3],
      |v: &Vec<i32>| Flux::from_iter(v.clone()),
      move |_| {
        c_released.fetch_add(1, Ordering::SeqCst);
      },
    )
  }

  #[test]
  fn cleanup_after_complete() {
    let released = Arc::new(AtomicUsize::new(0));
    assert_eq!(counted(&released).block_last(), Ok(Some(3)));
    eventually(|| released.load(Ordering::SeqCst) == 1);
  }

  #[test]
  fn cleanup_after_cancel() {
    let released = Arc::new(AtomicUsize::new(0));
    let subscriber = TestSubscriber::new(1);
    counted(&released).subscribe(subscriber.clone());
    assert_eq!(subscriber.await_items(1), vec![1]);
    subscriber.cancel();
    subscriber.cancel();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(subscriber.settle(), vec![Event::Next(1)]);
  }

  #[test]
  fn subscribe_hook_fires_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let hooked = Arc::new(AtomicUsize::new(0));
    let c_hooked = hooked.clone();
    let last = counted(&released)
      .do_on_subscribe(move |_| {
        c_hooked.fetch_add(1, Ordering::SeqCst);
      })
      .block_last();
    assert_eq!(last, Ok(Some(3)));
    assert_eq!(hooked.load(Ordering::SeqCst), 1);
  }
}
