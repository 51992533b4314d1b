use std::sync::{Arc, Mutex};

use crate::{
  error::Error,
  subscription::{ArcSubscription, UNBOUNDED},
  util::lock,
};

/// Receives the signals of one subscription.
///
/// `on_subscribe` arrives first, followed by any number of `on_next` calls
/// bounded by the requested demand, followed by at most one of `on_complete`
/// or `on_error`. Nothing arrives after a terminal signal or after the
/// subscription was cancelled.
pub trait Subscriber<T>: Send + Sync {
  fn on_subscribe(&self, subscription: ArcSubscription);

  fn on_next(&self, item: T);

  fn on_complete(&self);

  fn on_error(&self, err: Error);

  /// Probes for the conditional-next capability. Sources call this once when
  /// they are subscribed and keep the answer.
  fn conditional(self: Arc<Self>) -> Option<Arc<dyn ConditionalSubscriber<T>>> { None }
}

pub type ArcSubscriber<T> = Arc<dyn Subscriber<T>>;

/// A subscriber that can reject an item without consuming demand.
///
/// When `on_next_if` returns `false` the source treats the item as never
/// delivered and keeps the demand unit for the next one, saving the
/// `request(1)` round trip a plain `on_next` rejection would need.
pub trait ConditionalSubscriber<T>: Subscriber<T> {
  fn on_next_if(&self, item: T) -> bool;
}

/// Emits to whichever path the subscriber supports.
pub(crate) enum Emitter<T> {
  Plain(ArcSubscriber<T>),
  Conditional(Arc<dyn ConditionalSubscriber<T>>),
}

impl<T> Emitter<T> {
  pub(crate) fn new(subscriber: &ArcSubscriber<T>) -> Self {
    match subscriber.clone().conditional() {
      Some(conditional) => Emitter::Conditional(conditional),
      None => Emitter::Plain(subscriber.clone()),
    }
  }

  /// Returns whether the item consumed a unit of demand.
  pub(crate) fn emit(&self, item: T) -> bool {
    match self {
      Emitter::Plain(s) => {
        s.on_next(item);
        true
      }
      Emitter::Conditional(s) => s.on_next_if(item),
    }
  }
}

type NextFn<T> = Box<dyn Fn(T) + Send + Sync>;
type ErrorFn = Box<dyn Fn(Error) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// A subscriber assembled from closures. It requests unbounded demand as soon
/// as it is subscribed.
pub struct LambdaSubscriber<T> {
  next: NextFn<T>,
  error: ErrorFn,
  complete: CompleteFn,
  subscription: Mutex<Option<ArcSubscription>>,
}

impl<T> LambdaSubscriber<T> {
  pub fn new(
    next: impl Fn(T) + Send + Sync + 'static,
    error: impl Fn(Error) + Send + Sync + 'static,
    complete: impl Fn() + Send + Sync + 'static,
  ) -> Self {
    LambdaSubscriber {
      next: Box::new(next),
      error: Box::new(error),
      complete: Box::new(complete),
      subscription: Mutex::new(None),
    }
  }

  pub fn on_next_only(next: impl Fn(T) + Send + Sync + 'static) -> Self {
    Self::new(next, |_| {}, || {})
  }

  /// Cancels the subscription this subscriber holds, if any.
  pub fn cancel(&self) {
    if let Some(s) = lock(&self.subscription).take() {
      s.cancel();
    }
  }
}

impl<T> Subscriber<T> for LambdaSubscriber<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    *lock(&self.subscription) = Some(subscription.clone());
    subscription.request(UNBOUNDED);
  }

  fn on_next(&self, item: T) { (self.next)(item) }

  fn on_complete(&self) {
    lock(&self.subscription).take();
    (self.complete)()
  }

  fn on_error(&self, err: Error) {
    lock(&self.subscription).take();
    (self.error)(err)
  }
}
