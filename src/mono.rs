//! [`Mono`]: a stream of at most one item.

use std::{
  sync::{mpsc::Receiver, Arc},
  time::Duration,
};

use crate::{
  block::Pick,
  error::{Error, Result},
  flux::{box_mapper, Flux},
  ops::shared_operators,
  publisher::{self, BoxedPublisher, Producer, Publisher, ScalarCallable},
  scheduler::{ArcScheduler, Scheduler},
  signal::Signal,
  sink::{MonoSink, OverflowStrategy},
  subscriber::ArcSubscriber,
  subscription::ArcSubscription,
};

/// A cold publisher of at most one item followed by completion, or an error.
///
/// ```rust
/// use reflux::prelude::*;
///
/// let answer = Mono::just(21).map(|v| v * 2);
/// assert_eq!(answer.block(), Ok(Some(42)));
/// assert_eq!(Mono::<i32>::empty().block(), Ok(None));
/// ```
pub struct Mono<T>(pub(crate) Producer<T>);

impl<T> Clone for Mono<T> {
  fn clone(&self) -> Self { Mono(self.0.clone()) }
}

impl<T: Send + 'static> Publisher<T> for Mono<T> {
  fn subscribe_on(
    &self,
    subscriber: ArcSubscriber<T>,
    scheduler: Option<ArcScheduler>,
  ) -> ArcSubscription {
    self.0.produce(subscriber, scheduler)
  }

  fn as_scalar(&self) -> Option<&dyn ScalarCallable<T>> { self.0.scalar().map(|s| &**s) }
}

impl<T: Send + 'static> Mono<T> {
  pub fn just(item: T) -> Self
  where
    T: Clone + Sync,
  {
    Mono(Producer::from_scalar(Arc::new(move || Some(item.clone()))))
  }

  /// `Some` becomes the item, `None` an empty mono.
  pub fn just_or_empty(item: Option<T>) -> Self
  where
    T: Clone + Sync,
  {
    match item {
      Some(item) => Self::just(item),
      None => Self::empty(),
    }
  }

  /// Reads `callable` for every subscription, once demand arrives.
  pub fn from_callable(callable: impl Fn() -> Option<T> + Send + Sync + 'static) -> Self {
    Mono(Producer::from_scalar(Arc::new(callable)))
  }

  pub fn empty() -> Self { Mono(Producer::empty()) }

  pub fn error(err: Error) -> Self { Mono(Producer::error(err)) }

  pub fn never() -> Self { Mono(Producer::never()) }

  pub fn defer(supplier: impl Fn() -> Mono<T> + Send + Sync + 'static) -> Self {
    Mono(Flux::defer(supplier).0)
  }

  /// See [`Flux::using`].
  pub fn using<R>(
    acquire: impl Fn() -> R + Send + Sync + 'static,
    source: impl Fn(&R) -> Mono<T> + Send + Sync + 'static,
    cleanup: impl Fn(R) + Send + Sync + 'static,
  ) -> Self
  where
    R: Send + 'static,
  {
    Mono(Flux::using(acquire, source, cleanup).0)
  }

  /// Runs `f` with a [`MonoSink`] on the scheduler. The first of `success`,
  /// `success_empty` or `error` settles the mono.
  pub fn create(f: impl Fn(MonoSink<T>) + Send + Sync + 'static) -> Self {
    let f: Arc<dyn Fn(MonoSink<T>) + Send + Sync> = Arc::new(f);
    Mono(Producer::new(move |subscriber, scheduler| {
      let strategy = OverflowStrategy::Buffer;
      publisher::create::produce(strategy, MonoSink::new, f.clone(), subscriber, scheduler)
    }))
  }

  /// The first item received on `receiver`; empty if every sender is dropped
  /// before one arrives.
  pub fn from_channel(receiver: Receiver<T>) -> Self {
    Mono(Flux::from_channel(receiver).0.take(1))
  }

  shared_operators!(Mono);

  pub fn flat_map<R>(&self, mapper: impl Fn(T) -> Mono<R> + Send + Sync + 'static) -> Mono<R>
  where
    R: Send + 'static,
  {
    Mono(self.0.flat_map(box_mapper(mapper), None))
  }

  /// Like `flat_map`, subscribing the inner mono on `scheduler`.
  pub fn flat_map_on<R>(
    &self,
    mapper: impl Fn(T) -> Mono<R> + Send + Sync + 'static,
    scheduler: impl Scheduler + 'static,
  ) -> Mono<R>
  where
    R: Send + 'static,
  {
    Mono(self.0.flat_map(box_mapper(mapper), Some(Arc::new(scheduler))))
  }

  /// Expands the item into the items of the publisher `mapper` returns.
  pub fn flat_map_many<R, P>(&self, mapper: impl Fn(T) -> P + Send + Sync + 'static) -> Flux<R>
  where
    R: Send + 'static,
    P: Publisher<R> + 'static,
  {
    Flux(self.0.flat_map(box_mapper(mapper), None))
  }

  /// This mono's item, if any, followed by the items of `publishers`.
  pub fn concat_with(&self, publishers: Vec<BoxedPublisher<T>>) -> Flux<T> {
    Flux(self.0.concat(Producer::from_iter(publishers)))
  }

  /// Fires when the mono completes successfully, with or without an item.
  pub fn do_on_success(&self, f: impl Fn() + Send + Sync + 'static) -> Mono<T> {
    self.do_on_complete(f)
  }

  /// The item and the terminal event as [`Signal`] items.
  pub fn materialize(&self) -> Flux<Signal<T>> { Flux(self.0.materialize()) }

  /// Blocks until the mono terminates.
  pub fn block(&self) -> Result<Option<T>> { self.0.block(Pick::Last, None) }

  pub fn block_timeout(&self, timeout: Duration) -> Result<Option<T>> {
    self.0.block(Pick::Last, Some(timeout))
  }
}

impl<T: Send + 'static> Mono<Signal<T>> {
  pub fn dematerialize(&self) -> Mono<T> { Mono(self.0.dematerialize()) }
}
