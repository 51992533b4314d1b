//! A scripted subscriber for integration tests: declare the expected signals
//! and the demand to issue between them, then `verify`.

#![allow(dead_code)]

use std::{
  fmt::Debug,
  sync::{
    mpsc::{channel, Receiver, Sender},
    Arc, Mutex,
  },
  time::{Duration, Instant},
};

use reflux::prelude::*;

/// How long any single expectation waits for its signal.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Recorded<T> {
  Next(T),
  Complete,
  Error(Error),
}

struct Recorder<T> {
  initial: u64,
  events: Mutex<Sender<Recorded<T>>>,
  subscription: Mutex<Option<ArcSubscription>>,
}

impl<T: Send> Recorder<T> {
  fn record(&self, event: Recorded<T>) { let _ = self.events.lock().unwrap().send(event); }
}

impl<T: Send> Subscriber<T> for Recorder<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    *self.subscription.lock().unwrap() = Some(subscription.clone());
    if self.initial > 0 {
      subscription.request(self.initial);
    }
  }

  fn on_next(&self, item: T) { self.record(Recorded::Next(item)) }

  fn on_complete(&self) { self.record(Recorded::Complete) }

  fn on_error(&self, err: Error) { self.record(Recorded::Error(err)) }
}

enum Step<T> {
  Next(Box<dyn Fn(&T) -> bool>, String),
  NextCount(usize),
  Complete,
  Error(Box<dyn Fn(&Error) -> bool>, String),
  Request(u64),
  Cancel,
  NoEvents(Duration),
  Await(Duration),
  Run(Box<dyn FnOnce()>),
}

pub struct StepVerifier<T> {
  publisher: BoxedPublisher<T>,
  initial: u64,
  steps: Vec<Step<T>>,
}

impl<T: Debug + Send + 'static> StepVerifier<T> {
  /// Subscribes with unbounded initial demand.
  pub fn create(publisher: impl Publisher<T> + 'static) -> Self {
    Self::with_request(publisher, UNBOUNDED)
  }

  /// Subscribes requesting `initial` items; 0 requests nothing.
  pub fn with_request(publisher: impl Publisher<T> + 'static, initial: u64) -> Self {
    StepVerifier { publisher: Arc::new(publisher), initial, steps: vec![] }
  }

  pub fn expect_next(self, expected: T) -> Self
  where
    T: PartialEq,
  {
    let description = format!("{expected:?}");
    self.step(Step::Next(Box::new(move |item| *item == expected), description))
  }

  pub fn expect_next_matches(self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
    self.step(Step::Next(Box::new(predicate), "an item matching the predicate".into()))
  }

  /// Consumes `count` items without looking at them.
  pub fn expect_next_count(self, count: usize) -> Self { self.step(Step::NextCount(count)) }

  pub fn expect_complete(self) -> Self { self.step(Step::Complete) }

  pub fn expect_error(self, expected: Error) -> Self {
    let description = format!("{expected:?}");
    self.step(Step::Error(Box::new(move |err| *err == expected), description))
  }

  pub fn expect_error_matches(self, predicate: impl Fn(&Error) -> bool + 'static) -> Self {
    self.step(Step::Error(Box::new(predicate), "an error matching the predicate".into()))
  }

  pub fn then_request(self, n: u64) -> Self { self.step(Step::Request(n)) }

  pub fn then_cancel(self) -> Self { self.step(Step::Cancel) }

  /// Asserts nothing arrives for `window`.
  pub fn expect_no_event(self, window: Duration) -> Self { self.step(Step::NoEvents(window)) }

  /// Pauses the script; signals arriving meanwhile stay buffered.
  pub fn then_await(self, pause: Duration) -> Self { self.step(Step::Await(pause)) }

  pub fn then(self, f: impl FnOnce() + 'static) -> Self { self.step(Step::Run(Box::new(f))) }

  /// Subscribes and runs the script. After a terminal expectation, also
  /// asserts nothing follows it.
  pub fn verify(self) {
    let (tx, rx) = channel();
    let recorder = Arc::new(Recorder {
      initial: self.initial,
      events: Mutex::new(tx),
      subscription: Mutex::new(None),
    });
    self.publisher.subscribe(recorder.clone());
    let subscription = || {
      recorder.subscription.lock().unwrap().clone().expect("on_subscribe was never called")
    };
    let mut terminated = false;
    for step in self.steps {
      match step {
        Step::Next(check, description) => match next(&rx, &description) {
          Recorded::Next(item) => assert!(check(&item), "expected {description}, got {item:?}"),
          other => panic!("expected {description}, got {other:?}"),
        },
        Step::NextCount(count) => {
          for i in 0..count {
            match next(&rx, "an item") {
              Recorded::Next(_) => {}
              other => panic!("expected item {} of {count}, got {other:?}", i + 1),
            }
          }
        }
        Step::Complete => {
          match next(&rx, "completion") {
            Recorded::Complete => {}
            other => panic!("expected completion, got {other:?}"),
          }
          terminated = true;
        }
        Step::Error(check, description) => {
          match next(&rx, &description) {
            Recorded::Error(err) => assert!(check(&err), "expected {description}, got {err:?}"),
            other => panic!("expected {description}, got {other:?}"),
          }
          terminated = true;
        }
        Step::Request(n) => subscription().request(n),
        Step::Cancel => subscription().cancel(),
        Step::NoEvents(window) => {
          if let Ok(event) = rx.recv_timeout(window) {
            panic!("expected no event, got {event:?}");
          }
        }
        Step::Await(pause) => std::thread::sleep(pause),
        Step::Run(f) => f(),
      }
    }
    if terminated {
      if let Ok(event) = rx.recv_timeout(Duration::from_millis(20)) {
        panic!("signal after the terminal one: {event:?}");
      }
    }
  }

  fn step(mut self, step: Step<T>) -> Self {
    self.steps.push(step);
    self
  }
}

/// Spins until `check` holds, failing after [`STEP_TIMEOUT`].
pub fn eventually(check: impl Fn() -> bool) {
  let deadline = Instant::now() + STEP_TIMEOUT;
  while !check() {
    assert!(Instant::now() < deadline, "condition not reached in time");
    std::thread::sleep(Duration::from_millis(1));
  }
}

fn next<T>(rx: &Receiver<Recorded<T>>, waiting_for: &str) -> Recorded<T> {
  rx.recv_timeout(STEP_TIMEOUT)
    .unwrap_or_else(|_| panic!("timed out waiting for {waiting_for}"))
}
