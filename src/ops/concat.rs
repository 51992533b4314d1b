//! Sequential concatenation of a stream of publishers.
//!
//! The stage first relays the stream it is lifted onto, then pulls one
//! publisher at a time from the publishers stream and relays it, each only
//! after the previous one completed. Downstream demand not yet satisfied
//! carries over to the next inner subscription.
//!
//! The publishers stream and every inner publisher run on fresh default
//! workers, not on the scheduler the chain was subscribed on. The publishers
//! stream parks its worker while it waits for the next request, which would
//! starve the inner publishers on a single-worker scheduler.

use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::OnceCell;

use super::stage::Stage;
use crate::{
  error::Error,
  publisher::{BoxedPublisher, Processor, Producer},
  subscriber::{ArcSubscriber, Subscriber},
  subscription::{ArcSubscription, Subscription, UNBOUNDED},
  util::lock,
};

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn concat(&self, publishers: Producer<BoxedPublisher<T>>) -> Producer<T> {
    self.lift(move || ConcatProcessor::new(publishers.clone()))
  }
}

#[derive(Default)]
struct ConcatState {
  pending: u64,
  unbounded: bool,
  /// An inner subscription (or the first stream) is running.
  active: bool,
  /// The publishers stream completed.
  exhausted: bool,
  inner_started: bool,
}

impl ConcatState {
  fn outstanding(&self) -> u64 { if self.unbounded { UNBOUNDED } else { self.pending } }
}

pub(crate) struct ConcatProcessor<T> {
  stage: Stage<T>,
  publishers: Producer<BoxedPublisher<T>>,
  outer: OnceCell<ArcSubscription>,
  state: Mutex<ConcatState>,
}

impl<T: Send + 'static> ConcatProcessor<T> {
  fn new(publishers: Producer<BoxedPublisher<T>>) -> Arc<Self> {
    Arc::new(ConcatProcessor {
      stage: Stage::default(),
      publishers,
      outer: OnceCell::new(),
      state: Mutex::new(ConcatState { active: true, ..ConcatState::default() }),
    })
  }

  fn cancel_outer(&self) {
    if let Some(outer) = self.outer.get() {
      outer.cancel();
    }
  }

  /// Called by the publishers stream with the next publisher to relay.
  fn subscribe_next(self: &Arc<Self>, publisher: BoxedPublisher<T>) {
    {
      let mut state = lock(&self.state);
      state.active = true;
      state.inner_started = true;
    }
    publisher.subscribe_on(self.clone(), None);
  }

  fn publishers_done(&self) {
    let finished = {
      let mut state = lock(&self.state);
      state.exhausted = true;
      !state.active
    };
    if finished {
      self.stage.complete();
    }
  }
}

impl<T: Send + 'static> Subscriber<T> for ConcatProcessor<T> {
  /// A new inner subscription inherits the demand still outstanding. The
  /// switch happens under the state lock so a concurrent `request` is
  /// counted exactly once.
  fn on_subscribe(&self, subscription: ArcSubscription) {
    let inherited = {
      let state = lock(&self.state);
      if !self.stage.set_upstream(subscription.clone()) {
        return;
      }
      if state.inner_started { state.outstanding() } else { 0 }
    };
    if inherited > 0 {
      subscription.request(inherited);
    }
  }

  fn on_next(&self, item: T) {
    {
      let mut state = lock(&self.state);
      if !state.unbounded {
        state.pending = state.pending.saturating_sub(1);
      }
    }
    self.stage.next(item);
  }

  fn on_complete(&self) {
    let finished = {
      let mut state = lock(&self.state);
      state.active = false;
      state.exhausted
    };
    if finished {
      self.stage.complete();
    } else if let Some(outer) = self.outer.get() {
      outer.request(1);
    }
  }

  fn on_error(&self, err: Error) {
    self.cancel_outer();
    self.stage.error(err);
  }
}

impl<T: Send + 'static> Subscription for ConcatProcessor<T> {
  fn request(&self, n: u64) {
    let upstream = {
      let mut state = lock(&self.state);
      if n == UNBOUNDED {
        state.unbounded = true;
      } else if !state.unbounded {
        state.pending = state.pending.saturating_add(n);
      }
      self.stage.upstream()
    };
    if let Some(upstream) = upstream {
      upstream.request(n);
    }
  }

  fn cancel(&self) {
    self.stage.cancel();
    self.cancel_outer();
  }
}

impl<T: Send + 'static> Processor<T, T> for ConcatProcessor<T> {
  /// Binds the downstream, then subscribes the publishers stream, which stays
  /// idle until the first stream completes and asks it for one publisher.
  fn bind(self: Arc<Self>, downstream: ArcSubscriber<T>) -> ArcSubscription {
    self.stage.bind(downstream);
    let observer = Arc::new(PublisherObserver { processor: Arc::downgrade(&self) });
    let outer = self.publishers.produce(observer, None);
    let _ = self.outer.set(outer);
    self
  }
}

/// Subscriber to the publishers stream. Holds its processor weakly since the
/// processor owns the subscription feeding it.
struct PublisherObserver<T> {
  processor: Weak<ConcatProcessor<T>>,
}

impl<T: Send + 'static> Subscriber<BoxedPublisher<T>> for PublisherObserver<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    match self.processor.upgrade() {
      Some(p) => {
        let _ = p.outer.set(subscription);
      }
      None => subscription.cancel(),
    }
  }

  fn on_next(&self, publisher: BoxedPublisher<T>) {
    if let Some(p) = self.processor.upgrade() {
      p.subscribe_next(publisher);
    }
  }

  fn on_complete(&self) {
    if let Some(p) = self.processor.upgrade() {
      p.publishers_done();
    }
  }

  /// Stops the running stream and reports the failure through the
  /// processor's own error path.
  fn on_error(&self, err: Error) {
    if let Some(p) = self.processor.upgrade() {
      p.stage.cancel_upstream();
      Producer::<T>::error(err).produce(p, None);
    }
  }
}
