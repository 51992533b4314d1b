#![cfg(test)]
use std::{
  sync::{Arc, Condvar, Mutex},
  time::{Duration, Instant},
};

use crate::{
  error::Error,
  subscriber::Subscriber,
  subscription::{ArcSubscription, UNBOUNDED},
};

pub const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
  Next(T),
  Complete,
  Error(Error),
}

/// Records every signal and lets a test wait for them.
pub struct TestSubscriber<T> {
  initial: u64,
  state: Mutex<Recorded<T>>,
  cond: Condvar,
}

struct Recorded<T> {
  subscription: Option<ArcSubscription>,
  subscribe_calls: usize,
  events: Vec<Event<T>>,
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
  /// `initial` is requested from inside `on_subscribe`; 0 requests nothing.
  pub fn new(initial: u64) -> Arc<Self> {
    Arc::new(TestSubscriber {
      initial,
      state: Mutex::new(Recorded { subscription: None, subscribe_calls: 0, events: vec![] }),
      cond: Condvar::new(),
    })
  }

  pub fn unbounded() -> Arc<Self> { Self::new(UNBOUNDED) }

  pub fn events(&self) -> Vec<Event<T>> { self.state.lock().unwrap().events.clone() }

  pub fn items(&self) -> Vec<T> {
    self
      .events()
      .into_iter()
      .filter_map(|e| match e {
        Event::Next(v) => Some(v),
        _ => None,
      })
      .collect()
  }

  pub fn subscribe_calls(&self) -> usize { self.state.lock().unwrap().subscribe_calls }

  pub fn request(&self, n: u64) {
    let s = self.state.lock().unwrap().subscription.clone();
    s.expect("not subscribed").request(n);
  }

  pub fn cancel(&self) {
    let s = self.state.lock().unwrap().subscription.clone();
    s.expect("not subscribed").cancel();
  }

  pub fn await_terminal(&self) -> Vec<Event<T>> {
    self.wait_until(|events| {
      events.iter().any(|e| matches!(e, Event::Complete | Event::Error(_)))
    });
    self.events()
  }

  pub fn await_items(&self, n: usize) -> Vec<T> {
    self.wait_until(|events| events.iter().filter(|e| matches!(e, Event::Next(_))).count() >= n);
    self.items()
  }

  /// Gives asynchronous producers a moment, for asserting that nothing more
  /// arrives.
  pub fn settle(&self) -> Vec<Event<T>> {
    std::thread::sleep(Duration::from_millis(50));
    self.events()
  }

  fn wait_until(&self, done: impl Fn(&[Event<T>]) -> bool) {
    let deadline = Instant::now() + WAIT;
    let mut state = self.state.lock().unwrap();
    while !done(&state.events) {
      let now = Instant::now();
      assert!(now < deadline, "timed out waiting, got {} events", state.events.len());
      state = self.cond.wait_timeout(state, deadline - now).unwrap().0;
    }
  }

  fn push(&self, event: Event<T>) {
    self.state.lock().unwrap().events.push(event);
    self.cond.notify_all();
  }
}

impl<T: Clone + Send + 'static> Subscriber<T> for TestSubscriber<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    {
      let mut state = self.state.lock().unwrap();
      state.subscribe_calls += 1;
      state.subscription = Some(subscription.clone());
    }
    if self.initial > 0 {
      subscription.request(self.initial);
    }
  }

  fn on_next(&self, item: T) { self.push(Event::Next(item)) }

  fn on_complete(&self) { self.push(Event::Complete) }

  fn on_error(&self, err: Error) { self.push(Event::Error(err)) }
}

/// Spins until `check` holds, failing the test after [`WAIT`].
pub fn eventually(check: impl Fn() -> bool) {
  let deadline = Instant::now() + WAIT;
  while !check() {
    assert!(Instant::now() < deadline, "condition not reached in time");
    std::thread::sleep(Duration::from_millis(1));
  }
}
