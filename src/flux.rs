//! [`Flux`]: a stream of zero to many items.

use std::{
  sync::{mpsc::Receiver, Arc, Mutex},
  time::Duration,
};

use crate::{
  block::Pick,
  error::{Error, Result},
  mono::Mono,
  ops::shared_operators,
  publisher::{self, BoxedPublisher, Producer, Publisher, ScalarCallable},
  scheduler::{ArcScheduler, Scheduler},
  signal::Signal,
  sink::{FluxSink, OverflowStrategy, SynchronousSink},
  subscriber::ArcSubscriber,
  subscription::ArcSubscription,
};

/// A cold publisher of zero to many items followed by completion or an error.
///
/// Every subscription runs the whole pipeline anew. Operators return a new
/// `Flux` and leave the receiver untouched, so a `Flux` can be kept and
/// subscribed many times.
///
/// ```rust
/// use reflux::prelude::*;
///
/// let evens = Flux::range(1, 10).filter(|v| v % 2 == 0).map(|v| v * 10);
/// assert_eq!(evens.block_last(), Ok(Some(100)));
/// assert_eq!(evens.count().block(), Ok(Some(5)));
/// ```
pub struct Flux<T>(pub(crate) Producer<T>);

impl<T> Clone for Flux<T> {
  fn clone(&self) -> Self { Flux(self.0.clone()) }
}

impl<T: Send + 'static> Publisher<T> for Flux<T> {
  fn subscribe_on(
    &self,
    subscriber: ArcSubscriber<T>,
    scheduler: Option<ArcScheduler>,
  ) -> ArcSubscription {
    self.0.produce(subscriber, scheduler)
  }

  fn as_scalar(&self) -> Option<&dyn ScalarCallable<T>> { self.0.scalar().map(|s| &**s) }
}

impl<T: Send + 'static> From<Mono<T>> for Flux<T> {
  fn from(mono: Mono<T>) -> Self { Flux(mono.0) }
}

impl<T: Send + 'static> Flux<T> {
  /// A single item, re-emitted for every subscription.
  pub fn just(item: T) -> Self
  where
    T: Clone + Sync,
  {
    Flux(Producer::from_scalar(Arc::new(move || Some(item.clone()))))
  }

  /// The items of `iter`, iterated afresh for every subscription. Items are
  /// pulled lazily as demand arrives, so unbounded iterators are fine.
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
  {
    Flux(Producer::from_iter(iter))
  }

  /// Completes right away.
  pub fn empty() -> Self { Flux(Producer::empty()) }

  /// Fails right away with `err`.
  pub fn error(err: Error) -> Self { Flux(Producer::error(err)) }

  /// Never signals anything.
  pub fn never() -> Self { Flux(Producer::never()) }

  /// Builds the publisher with `supplier` when subscribed.
  pub fn defer<P>(supplier: impl Fn() -> P + Send + Sync + 'static) -> Self
  where
    P: Publisher<T> + 'static,
  {
    let supplier: Arc<dyn Fn() -> P + Send + Sync> = Arc::new(supplier);
    Flux(Producer::new(move |subscriber, scheduler| {
      publisher::defer::produce(supplier.clone(), subscriber, scheduler)
    }))
  }

  /// Acquires a resource per subscription, streams the publisher built from
  /// it, then hands it to `cleanup` once the subscription terminated or was
  /// cancelled.
  pub fn using<R, P>(
    acquire: impl Fn() -> R + Send + Sync + 'static,
    source: impl Fn(&R) -> P + Send + Sync + 'static,
    cleanup: impl Fn(R) + Send + Sync + 'static,
  ) -> Self
  where
    R: Send + 'static,
    P: Publisher<T> + 'static,
  {
    let cleanup: Arc<dyn Fn(R) + Send + Sync> = Arc::new(cleanup);
    Flux(Producer::new(move |subscriber, scheduler| {
      publisher::using::produce(&acquire, &source, cleanup.clone(), subscriber, scheduler)
    }))
  }

  /// Runs `f` with a push sink on the scheduler. Items pushed beyond the
  /// requested demand are handled per `strategy`.
  ///
  /// ```rust
  /// use reflux::prelude::*;
  ///
  /// let flux = Flux::create(
  ///   |sink: FluxSink<&str>| {
  ///     sink.next("a");
  ///     sink.next("b");
  ///     sink.complete();
  ///   },
  ///   OverflowStrategy::Buffer,
  /// );
  /// assert_eq!(flux.block_last(), Ok(Some("b")));
  /// ```
  pub fn create(
    f: impl Fn(FluxSink<T>) + Send + Sync + 'static,
    strategy: OverflowStrategy,
  ) -> Self {
    let f: Arc<dyn Fn(FluxSink<T>) + Send + Sync> = Arc::new(f);
    Flux(Producer::new(move |subscriber, scheduler| {
      publisher::create::produce(strategy, FluxSink::new, f.clone(), subscriber, scheduler)
    }))
  }

  /// Calls `generator` once per requested item.
  pub fn generate(generator: impl Fn(&mut SynchronousSink<T>) + Send + Sync + 'static) -> Self {
    Self::generate_with_state(|| (), move |_: &mut (), sink| generator(sink))
  }

  /// Like `generate`, threading a state built by `init` per subscription.
  pub fn generate_with_state<S: 'static>(
    init: impl Fn() -> S + Send + Sync + 'static,
    generator: impl Fn(&mut S, &mut SynchronousSink<T>) + Send + Sync + 'static,
  ) -> Self {
    let init: Arc<dyn Fn() -> S + Send + Sync> = Arc::new(init);
    let generator: Arc<publisher::generate::GenerateFn<S, T>> = Arc::new(generator);
    Flux(Producer::new(move |subscriber, scheduler| {
      publisher::generate::produce(init.clone(), generator.clone(), subscriber, scheduler)
    }))
  }

  /// Emits what arrives on `receiver` and completes once every sender is
  /// dropped. Only one subscription may consume the channel.
  pub fn from_channel(receiver: Receiver<T>) -> Self {
    let receiver = Arc::new(Mutex::new(Some(receiver)));
    Flux(Producer::new(move |subscriber, scheduler| {
      publisher::from_channel::produce(&receiver, subscriber, scheduler)
    }))
  }

  shared_operators!(Flux);

  /// Suppresses items equal to the one right before them.
  pub fn distinct_until_changed(&self) -> Flux<T>
  where
    T: PartialEq + Clone,
  {
    Flux(self.0.distinct_until_changed())
  }

  /// The first `count` items, then completion.
  pub fn take(&self, count: u64) -> Flux<T> { Flux(self.0.take(count)) }

  /// Merges the publishers `mapper` returns per item. Inner publishers run
  /// concurrently, each on its own worker.
  pub fn flat_map<R, P>(&self, mapper: impl Fn(T) -> P + Send + Sync + 'static) -> Flux<R>
  where
    R: Send + 'static,
    P: Publisher<R> + 'static,
  {
    Flux(self.0.flat_map(box_mapper(mapper), None))
  }

  /// Like `flat_map`, subscribing inner publishers on `scheduler`.
  pub fn flat_map_on<R, P>(
    &self,
    mapper: impl Fn(T) -> P + Send + Sync + 'static,
    scheduler: impl Scheduler + 'static,
  ) -> Flux<R>
  where
    R: Send + 'static,
    P: Publisher<R> + 'static,
  {
    Flux(self.0.flat_map(box_mapper(mapper), Some(Arc::new(scheduler))))
  }

  pub fn count(&self) -> Mono<u64> { Mono(self.0.count()) }

  /// Folds the items pairwise; an empty flux reduces to an empty mono.
  pub fn reduce(&self, accumulator: impl Fn(T, T) -> T + Send + Sync + 'static) -> Mono<T> {
    Mono(self.0.reduce(Arc::new(accumulator)))
  }

  /// Emits the running fold after every item.
  pub fn scan(&self, accumulator: impl Fn(T, T) -> T + Send + Sync + 'static) -> Flux<T>
  where
    T: Clone,
  {
    Flux(self.0.scan(Arc::new(accumulator)))
  }

  pub fn all(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Mono<bool> {
    Mono(self.0.all(Arc::new(predicate)))
  }

  pub fn any(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Mono<bool> {
    Mono(self.0.any(Arc::new(predicate)))
  }

  pub fn has_elements(&self) -> Mono<bool> { self.any(|_| true) }

  pub fn has_element(&self, item: T) -> Mono<bool>
  where
    T: PartialEq + Sync,
  {
    self.any(move |v| *v == item)
  }

  /// Relays this flux, then every publisher `publishers` emits, one after
  /// the other.
  pub fn concat(&self, publishers: Flux<BoxedPublisher<T>>) -> Flux<T> {
    Flux(self.0.concat(publishers.0))
  }

  pub fn concat_with(&self, publishers: Vec<BoxedPublisher<T>>) -> Flux<T> {
    Flux(self.0.concat(Producer::from_iter(publishers)))
  }

  /// Every event as a [`Signal`] item, the terminal one included.
  pub fn materialize(&self) -> Flux<Signal<T>> { Flux(self.0.materialize()) }

  /// Blocks for the first item. Requests a single item and cancels after it.
  pub fn block_first(&self) -> Result<Option<T>> { self.0.block(Pick::First, None) }

  pub fn block_first_timeout(&self, timeout: Duration) -> Result<Option<T>> {
    self.0.block(Pick::First, Some(timeout))
  }

  /// Blocks until completion and returns the last item.
  pub fn block_last(&self) -> Result<Option<T>> { self.0.block(Pick::Last, None) }

  pub fn block_last_timeout(&self, timeout: Duration) -> Result<Option<T>> {
    self.0.block(Pick::Last, Some(timeout))
  }
}

impl Flux<i64> {
  /// `count` consecutive integers starting at `start`.
  pub fn range(start: i64, count: u64) -> Self { Flux(Producer::range(start, count)) }
}

impl<T: Send + 'static> Flux<Signal<T>> {
  /// Replays signal items as events. A terminal signal ends the flux.
  pub fn dematerialize(&self) -> Flux<T> { Flux(self.0.dematerialize()) }
}

pub(crate) fn box_mapper<T, R, P>(
  mapper: impl Fn(T) -> P + Send + Sync + 'static,
) -> crate::ops::flat_map::InnerMapper<T, R>
where
  P: Publisher<R> + 'static,
{
  Arc::new(move |item| Arc::new(mapper(item)) as BoxedPublisher<R>)
}
