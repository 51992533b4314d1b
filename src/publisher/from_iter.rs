use std::sync::Arc;

use super::{spawn_source, Producer};
use crate::{
  scheduler::ArcScheduler,
  subscriber::{ArcSubscriber, Emitter},
  subscription::ArcSubscription,
};

/// Emits `iter` one demand unit at a time, then completes.
///
/// A conditional subscriber rejecting an item gets the unit back, so rejected
/// items never cost a `request(1)` round trip.
pub(crate) fn produce_sequence<T, I>(
  iter: I,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription
where
  T: Send + 'static,
  I: Iterator<Item = T> + Send + 'static,
{
  let emitter = Emitter::new(&subscriber);
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| {
    for item in iter {
      if !demand.acquire() {
        return;
      }
      if !emitter.emit(item) {
        demand.refund();
      }
    }
    if !demand.is_cancelled() {
      c_subscriber.on_complete();
    }
  })
}

impl<T: Send + 'static> Producer<T> {
  /// Re-iterates a fresh clone of `iter` per subscription. Iterables whose
  /// exact size is 0 or 1 become scalar sources.
  pub(crate) fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
  {
    match iter.clone().into_iter().size_hint() {
      (_, Some(0)) => Producer::empty(),
      (1, Some(1)) => Producer::from_scalar(Arc::new(move || iter.clone().into_iter().next())),
      _ => Producer::new(move |subscriber, scheduler| {
        produce_sequence(iter.clone().into_iter(), subscriber, scheduler)
      }),
    }
  }
}

impl Producer<i64> {
  /// `count` consecutive integers from `start`.
  pub(crate) fn range(start: i64, count: u64) -> Self {
    Producer::from_iter((0..count).map(move |offset| start.wrapping_add(offset as i64)))
  }
}

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_subscriber::{Event, TestSubscriber},
  };

  #[test]
  fn honours_demand() {
    let subscriber = TestSubscriber::new(2);
    Flux::from_iter(vec![1, 2, 3, 4]).subscribe(subscriber.clone());
    assert_eq!(subscriber.await_items(2), vec![1, 2]);
    assert_eq!(subscriber.settle().len(), 2);
    subscriber.request(5);
    assert_eq!(
      subscriber.await_terminal(),
      vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Next(4), Event::Complete]
    );
  }

  #[test]
  fn stops_after_cancel() {
    let subscriber = TestSubscriber::new(1);
    Flux::from_iter(0..1000).subscribe(subscriber.clone());
    subscriber.await_items(1);
    subscriber.cancel();
    subscriber.request(10);
    assert_eq!(subscriber.settle(), vec![Event::Next(0)]);
  }

  #[test]
  fn range_emits_wide_integers() {
    let subscriber = TestSubscriber::unbounded();
    Flux::range(2, 3).subscribe(subscriber.clone());
    assert_eq!(
      subscriber.await_terminal(),
      vec![Event::Next(2i64), Event::Next(3), Event::Next(4), Event::Complete]
    );
  }

  #[test]
  fn cold_replay() {
    let flux = Flux::from_iter([1, 2, 3]);
    assert_eq!(flux.block_last(), Ok(Some(3)));
    assert_eq!(flux.block_first(), Ok(Some(1)));
    assert_eq!(flux.count().block(), Ok(Some(3)));
  }
}
