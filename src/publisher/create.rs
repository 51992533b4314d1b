use std::sync::Arc;

use crate::{
  scheduler::{or_default, ArcScheduler},
  sink::{flux_sink::SinkCore, OverflowStrategy, SinkSubscription},
  subscriber::ArcSubscriber,
  subscription::ArcSubscription,
};

/// Builds the sink synchronously, so the subscription exists before any user
/// code runs, then runs `f` with it on the scheduler.
pub(crate) fn produce<T, S>(
  strategy: OverflowStrategy,
  wrap: fn(Arc<SinkCore<T>>) -> S,
  f: Arc<dyn Fn(S) + Send + Sync>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription
where
  T: Send + 'static,
  S: Send + 'static,
{
  let core = Arc::new(SinkCore::new(strategy, subscriber.clone()));
  let subscription = Arc::new(SinkSubscription::new(core.clone()));
  subscriber.on_subscribe(subscription.clone());
  let sink = wrap(core.clone());
  let task = or_default(scheduler).schedule(Box::new(move |canceller| {
    canceller.on_cancel(Box::new(move || core.cancel()));
    if !canceller.is_cancelled() {
      f(sink)
    }
  }));
  subscription.attach(task);
  subscription
}

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_subscriber::{Event, TestSubscriber},
  };
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  #[test]
  fn buffered_producer() {
    let flux = Flux::create(
      |sink: FluxSink<i32>| {
        (1..=3).for_each(|i| sink.next(i));
        sink.complete();
      },
      OverflowStrategy::Buffer,
    );
    assert_eq!(flux.block_last(), Ok(Some(3)));
    assert_eq!(flux.count().block(), Ok(Some(3)));
  }

  #[test]
  fn dispose_on_complete() {
    let disposed = Arc::new(AtomicBool::new(false));
    let c_disposed = disposed.clone();
    let flux = Flux::create(
      move |sink: FluxSink<i32>| {
        let d = c_disposed.clone();
        sink.on_dispose(move || d.store(true, Ordering::SeqCst));
        sink.next(1);
        sink.complete();
      },
      OverflowStrategy::Buffer,
    );
    let subscriber = TestSubscriber::unbounded();
    flux.subscribe(subscriber.clone());
    assert_eq!(subscriber.await_terminal(), vec![Event::Next(1), Event::Complete]);
    assert!(disposed.load(Ordering::SeqCst));
  }

  #[test]
  fn sink_outlives_callback() {
    let flux = Flux::create(
      |sink: FluxSink<i32>| {
        std::thread::spawn(move || {
          sink.next(10);
          sink.next(20);
          sink.complete();
        });
      },
      OverflowStrategy::Buffer,
    );
    let subscriber = TestSubscriber::new(1);
    flux.subscribe(subscriber.clone());
    assert_eq!(subscriber.await_items(1), vec![10]);
    subscriber.request(1);
    assert_eq!(
      subscriber.await_terminal(),
      vec![Event::Next(10), Event::Next(20), Event::Complete]
    );
  }
}
