use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use super::flux_sink::SinkCore;
use super::FluxSink;
use crate::error::Error;

/// The push handle `Mono::create` hands to user code. The first of
/// `success`, `success_empty` or `error` settles the mono; the outcome is held
/// back until downstream requests.
pub struct MonoSink<T> {
  sink: FluxSink<T>,
  settled: Arc<AtomicBool>,
}

impl<T> Clone for MonoSink<T> {
  fn clone(&self) -> Self { Self { sink: self.sink.clone(), settled: self.settled.clone() } }
}

impl<T: Send + 'static> MonoSink<T> {
  pub(crate) fn new(core: Arc<SinkCore<T>>) -> Self {
    Self { sink: FluxSink::new(core), settled: Arc::new(AtomicBool::new(false)) }
  }

  pub fn success(&self, item: T) {
    if self.settle() {
      self.sink.next(item);
      self.sink.complete();
    }
  }

  pub fn success_empty(&self) {
    if self.settle() {
      self.sink.complete();
    }
  }

  pub fn error(&self, err: Error) {
    if self.settle() {
      self.sink.error(err);
    }
  }

  pub fn is_cancelled(&self) -> bool { self.sink.is_cancelled() }

  pub fn on_cancel(&self, f: impl FnOnce() + Send + 'static) -> &Self {
    self.sink.on_cancel(f);
    self
  }

  pub fn on_dispose(&self, f: impl FnOnce() + Send + 'static) -> &Self {
    self.sink.on_dispose(f);
    self
  }

  fn settle(&self) -> bool { !self.settled.swap(true, Ordering::SeqCst) }
}
