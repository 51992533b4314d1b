use std::sync::{Arc, Mutex};

use super::stage::{impl_processor, Stage, Trailer};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
  util::lock,
};

pub(crate) type Accumulator<T> = Arc<dyn Fn(T, T) -> T + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Folds with the first item as seed and emits the result on completion.
  /// An empty upstream completes empty.
  pub(crate) fn reduce(&self, accumulator: Accumulator<T>) -> Producer<T> {
    self.lift(move || {
      Arc::new(ReduceProcessor {
        stage: Stage::default(),
        accumulator: accumulator.clone(),
        acc: Mutex::new(None),
        trailer: Trailer::default(),
      })
    })
  }
}

/// Upstream is pulled one item at a time, starting once downstream asks for
/// the result.
pub(crate) struct ReduceProcessor<T> {
  stage: Stage<T>,
  accumulator: Accumulator<T>,
  acc: Mutex<Option<T>>,
  trailer: Trailer<T>,
}

impl<T: Send + 'static> Subscriber<T> for ReduceProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    {
      let mut acc = lock(&self.acc);
      *acc = Some(match acc.take() {
        Some(prev) => (self.accumulator)(prev, item),
        None => item,
      });
    }
    self.stage.request_upstream(1);
  }

  fn on_complete(&self) {
    match lock(&self.acc).take() {
      Some(acc) => {
        if let Some(acc) = self.trailer.offer(acc) {
          self.stage.finish(Some(acc));
        }
      }
      None => self.stage.complete(),
    }
  }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl<T: Send + 'static> Subscription for ReduceProcessor<T> {
  fn request(&self, n: u64) {
    match self.trailer.request(n) {
      Some(acc) => self.stage.finish(Some(acc)),
      None => self.stage.request_upstream(1),
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Send + 'static] ReduceProcessor<T>, T => T);
