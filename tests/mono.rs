mod support;

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  thread,
  time::Duration,
};

use reflux::prelude::*;
use support::{eventually, StepVerifier};

#[test]
fn create_settles_once() {
  let mono = Mono::create(|sink| {
    sink.success(1);
    sink.success(2);
    sink.error(Error::msg("late"));
  });
  StepVerifier::create(mono).expect_next(1).expect_complete().verify();
}

#[test]
fn create_from_another_thread() {
  let mono = Mono::create(|sink: MonoSink<&str>| {
    thread::spawn(move || {
      thread::sleep(Duration::from_millis(10));
      sink.success("late");
    });
  });
  assert_eq!(mono.block_timeout(Duration::from_secs(1)), Ok(Some("late")));
}

#[test]
fn create_holds_the_item_until_requested() {
  let mono = Mono::create(|sink| sink.success(5));
  StepVerifier::with_request(mono, 0)
    .expect_no_event(Duration::from_millis(30))
    .then_request(1)
    .expect_next(5)
    .expect_complete()
    .verify();
}

#[test]
fn create_empty_and_error() {
  let empty = Mono::<i32>::create(|sink| sink.success_empty());
  StepVerifier::create(empty).expect_complete().verify();
  StepVerifier::create(Mono::<i32>::create(|sink| sink.error(Error::Timeout)))
    .expect_error(Error::Timeout)
    .verify();
}

#[test]
fn callable_runs_per_subscription() {
  let calls = Arc::new(AtomicUsize::new(0));
  let c_calls = calls.clone();
  let mono = Mono::from_callable(move || Some(c_calls.fetch_add(1, Ordering::SeqCst)));
  assert_eq!(mono.block(), Ok(Some(0)));
  assert_eq!(mono.block(), Ok(Some(1)));
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn callable_waits_for_demand() {
  let calls = Arc::new(AtomicUsize::new(0));
  let c_calls = calls.clone();
  let mono = Mono::from_callable(move || {
    c_calls.fetch_add(1, Ordering::SeqCst);
    Some("value")
  });
  let c_calls = calls.clone();
  StepVerifier::with_request(mono, 0)
    .expect_no_event(Duration::from_millis(30))
    .then(move || assert_eq!(c_calls.load(Ordering::SeqCst), 0))
    .then_request(1)
    .expect_next("value")
    .expect_complete()
    .verify();
}

#[test]
fn scalar_operators_stay_lazy() {
  let mono = Mono::just(10).filter(|v| v % 2 == 0).map(|v| v + 1);
  StepVerifier::create(mono.clone()).expect_next(11).expect_complete().verify();
  StepVerifier::create(mono.filter(|v| *v > 100)).expect_complete().verify();
}

#[test]
fn chained_monos() {
  let mono = Mono::just(2)
    .flat_map(|v| Mono::create(move |sink| sink.success(v * 10)))
    .flat_map(|v| Mono::just(v + 1));
  StepVerifier::create(mono).expect_next(21).expect_complete().verify();
}

#[test]
fn expands_into_flux() {
  let flux = Mono::just(3u64).flat_map_many(|n| Flux::range(1, n));
  StepVerifier::create(flux)
    .expect_next(1)
    .expect_next(2)
    .expect_next(3)
    .expect_complete()
    .verify();
}

#[test]
fn error_recovery() {
  let recovered = Mono::<i32>::error(Error::msg("down")).on_error_resume(|_| Mono::just(0));
  assert_eq!(recovered.block(), Ok(Some(0)));
  let fallback = Mono::<i32>::error(Error::msg("down")).on_error_return(-1);
  assert_eq!(fallback.block(), Ok(Some(-1)));
}

#[test]
fn resource_is_released() {
  let released = Arc::new(AtomicUsize::new(0));
  let c_released = released.clone();
  let mono = Mono::using(
    || String::from("conn"),
    |conn| Mono::just(conn.len()),
    move |_| {
      c_released.fetch_add(1, Ordering::SeqCst);
    },
  );
  assert_eq!(mono.block(), Ok(Some(4)));
  eventually(|| released.load(Ordering::SeqCst) == 1);
}

#[test]
fn materialize_mono() {
  StepVerifier::create(Mono::<i32>::empty().materialize())
    .expect_next_matches(|s| s.is_on_complete())
    .expect_complete()
    .verify();
  StepVerifier::create(Mono::<i32>::error(Error::Timeout).materialize())
    .expect_next_matches(|s| s.error() == Some(&Error::Timeout))
    .expect_complete()
    .verify();
}
