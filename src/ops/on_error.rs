use std::sync::Arc;

use super::stage::{impl_passthrough_subscription, impl_processor, Stage, Trailer};
use crate::{
  error::Error,
  publisher::Producer,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
};

pub(crate) type ErrorMapper = Arc<dyn Fn(Error) -> Error + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Replaces an error with `fallback` followed by completion.
  pub(crate) fn on_error_return(&self, fallback: T) -> Producer<T>
  where
    T: Clone + Sync,
  {
    self.lift(move || {
      Arc::new(OnErrorReturnProcessor {
        stage: Stage::default(),
        fallback: fallback.clone(),
        trailer: Trailer::default(),
      })
    })
  }

  pub(crate) fn on_error_map(&self, mapper: ErrorMapper) -> Producer<T> {
    self.lift(move || {
      Arc::new(OnErrorMapProcessor { stage: Stage::default(), mapper: mapper.clone() })
    })
  }
}

pub(crate) struct OnErrorReturnProcessor<T> {
  stage: Stage<T>,
  fallback: T,
  trailer: Trailer<T>,
}

impl<T: Clone + Send + Sync + 'static> Subscriber<T> for OnErrorReturnProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    self.trailer.consumed();
    self.stage.next(item)
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) {
    log::debug!("replacing error with fallback item: {err}");
    if let Some(fallback) = self.trailer.offer(self.fallback.clone()) {
      self.stage.finish(Some(fallback))
    }
  }
}

impl<T: Clone + Send + Sync + 'static> Subscription for OnErrorReturnProcessor<T> {
  fn request(&self, n: u64) {
    match self.trailer.request(n) {
      Some(fallback) => self.stage.finish(Some(fallback)),
      None => self.stage.request_upstream(n),
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Clone + Send + Sync + 'static] OnErrorReturnProcessor<T>, T => T);

pub(crate) struct OnErrorMapProcessor<T> {
  stage: Stage<T>,
  mapper: ErrorMapper,
}

impl<T: Send + 'static> Subscriber<T> for OnErrorMapProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) { self.stage.next(item) }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error((self.mapper)(err)) }
}

impl_passthrough_subscription!([T: Send + 'static] OnErrorMapProcessor<T>);
impl_processor!([T: Send + 'static] OnErrorMapProcessor<T>, T => T);

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_subscriber::{Event, TestSubscriber},
  };

  #[test]
  fn error_becomes_fallback() {
    let subscriber = TestSubscriber::unbounded();
    Flux::from_iter([1, 2])
      .concat_with(vec![Flux::error(Error::msg("late")).into_boxed()])
      .on_error_return(-1)
      .subscribe(subscriber.clone());
    assert_eq!(
      subscriber.await_terminal(),
      vec![Event::Next(1), Event::Next(2), Event::Next(-1), Event::Complete]
    );
  }

  #[test]
  fn completion_untouched() {
    assert_eq!(Flux::from_iter([1, 2]).on_error_return(0).block_last(), Ok(Some(2)));
    assert_eq!(Mono::<i32>::error(Error::Timeout).on_error_return(7).block(), Ok(Some(7)));
  }

  #[test]
  fn fallback_waits_for_demand() {
    let subscriber = TestSubscriber::new(0);
    Flux::<i32>::error(Error::msg("e")).on_error_return(5).subscribe(subscriber.clone());
    assert!(subscriber.settle().is_empty());
    subscriber.request(1);
    assert_eq!(subscriber.await_terminal(), vec![Event::Next(5), Event::Complete]);
  }

  #[test]
  fn maps_error() {
    let mapped = Flux::<i32>::error(Error::msg("io"))
      .on_error_map(|e| Error::msg(format!("wrapped: {e}")))
      .block_last();
    assert_eq!(mapped, Err(Error::msg("wrapped: io")));
  }
}
