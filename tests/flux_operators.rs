//! Operator chains observed through the public API.

mod support;

use std::{
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
  },
  time::Duration,
};

use reflux::prelude::*;
use support::StepVerifier;

const QUIET: Duration = Duration::from_millis(30);

#[test]
fn chain_of_stages() {
  let flux = Flux::range(1, 20).filter(|v| v % 2 == 0).map(|v| v * v).take(3);
  StepVerifier::create(flux)
    .expect_next(4)
    .expect_next(16)
    .expect_next(36)
    .expect_complete()
    .verify();
}

#[test]
fn demand_is_never_exceeded() {
  StepVerifier::with_request(Flux::range(1, 10), 0)
    .expect_no_event(QUIET)
    .then_request(2)
    .expect_next(1)
    .expect_next(2)
    .expect_no_event(QUIET)
    .then_request(UNBOUNDED)
    .expect_next_count(8)
    .expect_complete()
    .verify();
}

#[test]
fn filter_rejections_keep_demand() {
  StepVerifier::with_request(Flux::range(1, 10).filter(|v| v % 3 == 0), 2)
    .expect_next(3)
    .expect_next(6)
    .expect_no_event(QUIET)
    .then_request(1)
    .expect_next(9)
    .then_request(1)
    .expect_complete()
    .verify();
}

#[test]
fn distinct_neighbours() {
  StepVerifier::create(Flux::from_iter(vec![1, 1, 2, 2, 2, 3, 1]).distinct_until_changed())
    .expect_next(1)
    .expect_next(2)
    .expect_next(3)
    .expect_next(1)
    .expect_complete()
    .verify();
}

#[test]
fn running_and_final_sums() {
  StepVerifier::create(Flux::range(1, 4).scan(|a, b| a + b))
    .expect_next(1)
    .expect_next(3)
    .expect_next(6)
    .expect_next(10)
    .expect_complete()
    .verify();
  StepVerifier::create(Flux::range(1, 4).reduce(|a, b| a + b))
    .expect_next(10)
    .expect_complete()
    .verify();
  StepVerifier::create(Flux::<i64>::empty().reduce(|a, b| a + b)).expect_complete().verify();
}

#[test]
fn verdicts() {
  assert_eq!(Flux::range(1, 5).all(|v| *v > 0).block(), Ok(Some(true)));
  assert_eq!(Flux::range(1, 5).all(|v| *v > 1).block(), Ok(Some(false)));
  assert_eq!(Flux::range(1, 5).any(|v| *v == 5).block(), Ok(Some(true)));
  assert_eq!(Flux::range(1, 5).has_element(7).block(), Ok(Some(false)));
  assert_eq!(Flux::<i64>::empty().has_elements().block(), Ok(Some(false)));
  assert_eq!(Flux::<i64>::empty().all(|_| false).block(), Ok(Some(true)));
  assert_eq!(Flux::from_iter(0..).any(|v| *v > 100).block(), Ok(Some(true)));
}

#[test]
fn count_items() {
  StepVerifier::create(Flux::range(0, 1000).count()).expect_next(1000).expect_complete().verify();
}

#[test]
fn take_cancels_upstream() {
  let cancelled = Arc::new(AtomicBool::new(false));
  let c_cancelled = cancelled.clone();
  let flux = Flux::from_iter(0..)
    .do_on_cancel(move || c_cancelled.store(true, Ordering::SeqCst))
    .take(2);
  StepVerifier::create(flux).expect_next(0).expect_next(1).expect_complete().verify();
  assert!(cancelled.load(Ordering::SeqCst));
}

#[test]
fn handle_decides_per_item() {
  let flux = Flux::range(1, 10).handle(|v, sink| match v {
    5 => sink.complete(),
    v if v % 2 == 1 => sink.next(v * 10),
    v => sink.next(-v),
  });
  StepVerifier::create(flux)
    .expect_next(10)
    .expect_next(-2)
    .expect_next(30)
    .expect_next(-4)
    .expect_complete()
    .verify();
}

#[test]
fn generate_with_state() {
  let fibonacci = Flux::generate_with_state(
    || (0u64, 1u64),
    |state, sink| {
      let (a, b) = *state;
      *state = (b, a + b);
      sink.next(a);
    },
  );
  StepVerifier::create(fibonacci.take(7))
    .expect_next(0)
    .expect_next(1)
    .expect_next(1)
    .expect_next(2)
    .expect_next(3)
    .expect_next(5)
    .expect_next(8)
    .expect_complete()
    .verify();
}

#[test]
fn generate_respects_demand() {
  let calls = Arc::new(AtomicUsize::new(0));
  let c_calls = calls.clone();
  let flux = Flux::generate(move |sink| sink.next(c_calls.fetch_add(1, Ordering::SeqCst)));
  StepVerifier::with_request(flux, 3)
    .expect_next(0)
    .expect_next(1)
    .expect_next(2)
    .expect_no_event(QUIET)
    .then_cancel()
    .verify();
  assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn error_fallbacks() {
  let failing =
    Flux::from_iter(vec![1, 2]).concat_with(vec![Flux::error(Error::msg("x")).into_boxed()]);
  StepVerifier::create(failing.on_error_return(0))
    .expect_next(1)
    .expect_next(2)
    .expect_next(0)
    .expect_complete()
    .verify();
  StepVerifier::create(failing.on_error_map(|_| Error::Timeout))
    .expect_next_count(2)
    .expect_error(Error::Timeout)
    .verify();
  StepVerifier::with_request(failing.on_error_resume(|_| Flux::from_iter(vec![9])), 1)
    .expect_next(1)
    .then_request(2)
    .expect_next(2)
    .expect_next(9)
    .expect_complete()
    .verify();
}

#[test]
fn resume_only_matching_errors() {
  let flux = Flux::<i32>::error(Error::Timeout)
    .on_error_resume_when(|e| e.is_timeout(), |_| Mono::just(1));
  StepVerifier::create(flux).expect_next(1).expect_complete().verify();
  let flux = Flux::<i32>::error(Error::msg("other"))
    .on_error_resume_when(|e| e.is_timeout(), |_| Mono::just(1));
  StepVerifier::create(flux).expect_error(Error::msg("other")).verify();
}

#[test]
fn materialized_round_trip() {
  let signals = Flux::from_iter(vec![1, 2]).materialize();
  StepVerifier::create(signals.clone())
    .expect_next_matches(|s| s.item() == Some(&1))
    .expect_next_matches(|s| s.item() == Some(&2))
    .expect_next_matches(|s| s.is_on_complete())
    .expect_complete()
    .verify();
  StepVerifier::create(signals.dematerialize())
    .expect_next(1)
    .expect_next(2)
    .expect_complete()
    .verify();
}

#[test]
fn into_stream_pulls() {
  use futures::{executor::block_on, StreamExt};

  let items: Vec<_> = block_on(Flux::range(0, 5).map(|v| v * 2).into_stream().collect());
  assert_eq!(items, vec![Ok(0), Ok(2), Ok(4), Ok(6), Ok(8)]);
}
