//! The stream engine: publishers as production functions, and the wiring
//! that chains operator stages onto them.

use std::sync::Arc;

use crate::{
  scheduler::{or_default, ArcScheduler},
  subscriber::{ArcSubscriber, Subscriber},
  subscription::{ArcSubscription, CompositeSubscription, Demand, SourceSubscription, Subscription},
};

pub(crate) mod create;
pub(crate) mod defer;
pub(crate) mod from_channel;
pub(crate) mod from_iter;
pub(crate) mod generate;
pub(crate) mod scalar;
pub(crate) mod trivial;
pub(crate) mod using;

/// A source of items under the demand protocol.
pub trait Publisher<T>: Send + Sync {
  /// Starts a new subscription. With `None` each source runs on its own
  /// fresh [`ThreadScheduler`](crate::scheduler::ThreadScheduler).
  fn subscribe_on(
    &self,
    subscriber: ArcSubscriber<T>,
    scheduler: Option<ArcScheduler>,
  ) -> ArcSubscription;

  fn subscribe(&self, subscriber: ArcSubscriber<T>) -> ArcSubscription {
    self.subscribe_on(subscriber, None)
  }

  /// Probes for the scalar capability: a publisher statically known to carry
  /// at most one item that can be read synchronously.
  fn as_scalar(&self) -> Option<&dyn ScalarCallable<T>> { None }
}

/// The type-erased publisher used where sub-streams are themselves items.
pub type BoxedPublisher<T> = Arc<dyn Publisher<T>>;

pub trait ScalarCallable<T>: Send + Sync {
  fn try_get(&self) -> Option<T>;
}

impl<T, F> ScalarCallable<T> for F
where
  F: Fn() -> Option<T> + Send + Sync,
{
  fn try_get(&self) -> Option<T> { self() }
}

/// An operator stage: one upstream subscription, one downstream subscriber.
///
/// The processor itself is the subscription its downstream controls it
/// through.
pub trait Processor<T, R>: Subscriber<T> + Subscription {
  fn bind(self: Arc<Self>, downstream: ArcSubscriber<R>) -> ArcSubscription;
}

type ProduceFn<T> =
  dyn Fn(ArcSubscriber<T>, Option<ArcScheduler>) -> ArcSubscription + Send + Sync;

/// A production function plus the optional scalar capability. `Flux` and
/// `Mono` are thin wrappers around it.
pub struct Producer<T> {
  produce: Arc<ProduceFn<T>>,
  scalar: Option<Arc<dyn ScalarCallable<T>>>,
}

impl<T> Clone for Producer<T> {
  fn clone(&self) -> Self { Self { produce: self.produce.clone(), scalar: self.scalar.clone() } }
}

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn new(
    produce: impl Fn(ArcSubscriber<T>, Option<ArcScheduler>) -> ArcSubscription
      + Send
      + Sync
      + 'static,
  ) -> Self {
    Producer { produce: Arc::new(produce), scalar: None }
  }

  /// A scalar source: waits for demand, then emits what `callable` yields.
  pub(crate) fn from_scalar(callable: Arc<dyn ScalarCallable<T>>) -> Self {
    let c_callable = callable.clone();
    Producer {
      produce: Arc::new(move |subscriber, scheduler| {
        scalar::produce(c_callable.clone(), subscriber, scheduler)
      }),
      scalar: Some(callable),
    }
  }

  pub(crate) fn produce(
    &self,
    subscriber: ArcSubscriber<T>,
    scheduler: Option<ArcScheduler>,
  ) -> ArcSubscription {
    (self.produce)(subscriber, scheduler)
  }

  pub(crate) fn scalar(&self) -> Option<&Arc<dyn ScalarCallable<T>>> { self.scalar.as_ref() }

  /// Chains a stage built fresh by `make` for every subscription.
  ///
  /// Wiring order: build the stage, bind it to the downstream, subscribe it
  /// upstream, hand it the upstream handle, then give the downstream a
  /// composite whose `request` reaches the stage and whose `cancel` reaches
  /// both.
  pub(crate) fn lift<R, P>(&self, make: impl Fn() -> Arc<P> + Send + Sync + 'static) -> Producer<R>
  where
    R: Send + 'static,
    P: Processor<T, R> + 'static,
  {
    let source = self.clone();
    Producer::new(move |subscriber: ArcSubscriber<R>, scheduler| {
      let processor = make();
      let stage = processor.clone().bind(subscriber.clone());
      let upstream = source.produce(processor.clone(), scheduler);
      processor.on_subscribe(upstream.clone());
      let composite: ArcSubscription = Arc::new(CompositeSubscription::new(stage).with(upstream));
      subscriber.on_subscribe(composite.clone());
      composite
    })
  }
}

/// Signals `on_subscribe`, then runs `body` on the scheduler with the
/// subscription's demand. Cancelling the subscription cancels the action and
/// wakes `body` if it waits for demand.
pub(crate) fn spawn_source<T>(
  subscriber: &ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
  body: impl FnOnce(Arc<Demand>) + Send + 'static,
) -> ArcSubscription {
  let demand = Arc::new(Demand::new());
  let subscription = Arc::new(SourceSubscription::new(demand.clone()));
  subscriber.on_subscribe(subscription.clone());
  let task = or_default(scheduler).schedule(Box::new(move |canceller| {
    let c_demand = demand.clone();
    canceller.on_cancel(Box::new(move || {
      c_demand.cancel();
    }));
    body(demand)
  }));
  subscription.attach(task);
  subscription
}
