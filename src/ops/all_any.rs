use std::sync::Arc;

use super::{
  filter::Predicate,
  stage::{impl_processor, Stage, Trailer},
};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
};

impl<T: Send + 'static> Producer<T> {
  /// `true` unless some item fails `predicate`; `true` for an empty upstream.
  pub(crate) fn all(&self, predicate: Predicate<T>) -> Producer<bool> {
    self.short_circuit(predicate, false)
  }

  /// `true` as soon as some item satisfies `predicate`.
  pub(crate) fn any(&self, predicate: Predicate<T>) -> Producer<bool> {
    self.short_circuit(predicate, true)
  }

  /// Stops at the first item whose predicate result equals `stop_on` and
  /// emits `stop_on`; emits `!stop_on` when upstream completes first.
  fn short_circuit(&self, predicate: Predicate<T>, stop_on: bool) -> Producer<bool> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::from_scalar(Arc::new(move || {
        Some(match scalar.try_get() {
          Some(item) if predicate(&item) == stop_on => stop_on,
          _ => !stop_on,
        })
      }));
    }
    self.lift(move || {
      let predicate = predicate.clone();
      Arc::new(ShortCircuitProcessor {
        stage: Stage::default(),
        predicate,
        stop_on,
        trailer: Trailer::default(),
      })
    })
  }
}

/// Shared by `all`, `any`, `has_element` and `has_elements`. Upstream is
/// pulled one item at a time since the output is a single verdict.
pub(crate) struct ShortCircuitProcessor<T> {
  stage: Stage<bool>,
  predicate: Predicate<T>,
  stop_on: bool,
  trailer: Trailer<bool>,
}

impl<T> ShortCircuitProcessor<T> {
  /// The verdict waits for downstream demand.
  fn verdict(&self, verdict: bool) {
    if let Some(verdict) = self.trailer.offer(verdict) {
      self.stage.finish(Some(verdict));
    }
  }
}

impl<T: Send + 'static> Subscriber<T> for ShortCircuitProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    if self.stage.is_done() {
      return;
    }
    if (self.predicate)(&item) == self.stop_on {
      self.stage.cancel_upstream();
      self.verdict(self.stop_on);
    } else {
      self.stage.request_upstream(1);
    }
  }

  fn on_complete(&self) { self.verdict(!self.stop_on) }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl<T: Send + 'static> Subscription for ShortCircuitProcessor<T> {
  fn request(&self, n: u64) {
    match self.trailer.request(n) {
      Some(verdict) => self.stage.finish(Some(verdict)),
      None => self.stage.request_upstream(1),
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Send + 'static] ShortCircuitProcessor<T>, T => bool);
