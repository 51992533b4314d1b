use std::{
  marker::PhantomData,
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
};

use super::stage::{impl_processor, Stage, Trailer};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
};

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn count(&self) -> Producer<u64> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::from_scalar(Arc::new(move || Some(scalar.try_get().map_or(0u64, |_| 1))));
    }
    self.lift(|| {
      Arc::new(CountProcessor::<T> {
        stage: Stage::default(),
        count: AtomicU64::new(0),
        trailer: Trailer::default(),
        _item: PhantomData,
      })
    })
  }
}

pub(crate) struct CountProcessor<T> {
  stage: Stage<u64>,
  count: AtomicU64,
  trailer: Trailer<u64>,
  _item: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Subscriber<T> for CountProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, _: T) {
    self.count.fetch_add(1, Ordering::SeqCst);
    self.stage.request_upstream(1);
  }

  /// The count waits for downstream demand.
  fn on_complete(&self) {
    if let Some(count) = self.trailer.offer(self.count.load(Ordering::SeqCst)) {
      self.stage.finish(Some(count));
    }
  }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl<T: Send + 'static> Subscription for CountProcessor<T> {
  fn request(&self, n: u64) {
    match self.trailer.request(n) {
      Some(count) => self.stage.finish(Some(count)),
      None => self.stage.request_upstream(1),
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Send + 'static] CountProcessor<T>, T => u64);
