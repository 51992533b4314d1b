use std::sync::Arc;

use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error, publisher::Producer, subscriber::Subscriber, subscription::ArcSubscription,
};

pub(crate) type Mapper<T, R> = Arc<dyn Fn(T) -> R + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn map<R: Send + 'static>(&self, mapper: Mapper<T, R>) -> Producer<R> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::from_scalar(Arc::new(move || scalar.try_get().map(|v| mapper(v))));
    }
    self.lift(move || Arc::new(MapProcessor { stage: Stage::default(), mapper: mapper.clone() }))
  }
}

pub(crate) struct MapProcessor<T, R> {
  stage: Stage<R>,
  mapper: Mapper<T, R>,
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<T> for MapProcessor<T, R> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) { self.stage.next((self.mapper)(item)) }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl_passthrough_subscription!([T: Send + 'static, R: Send + 'static] MapProcessor<T, R>);
impl_processor!([T: Send + 'static, R: Send + 'static] MapProcessor<T, R>, T => R);
