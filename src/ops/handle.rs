use std::sync::{Arc, Mutex};

use super::stage::{impl_passthrough_subscription, impl_processor, Stage};
use crate::{
  error::Error,
  publisher::Producer,
  sink::{Emission, SynchronousSink},
  subscriber::Subscriber,
  subscription::ArcSubscription,
  util::take_once,
};

pub(crate) type Handler<T, R> = Arc<dyn Fn(T, &mut SynchronousSink<R>) + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Runs `handler` once per item; the first sink call decides what the item
  /// becomes. Over a scalar the handler runs once per subscription, when the
  /// subscription is made.
  pub(crate) fn handle<R: Send + 'static>(&self, handler: Handler<T, R>) -> Producer<R> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::new(move |subscriber, scheduler| {
        let outcome = match scalar.try_get() {
          None => Producer::empty(),
          Some(item) => {
            let mut sink = SynchronousSink::new();
            handler(item, &mut sink);
            match sink.finish() {
              Emission::Next(value) => {
                let slot = Mutex::new(Some(value));
                Producer::from_scalar(Arc::new(move || take_once(&slot)))
              }
              Emission::Complete => Producer::empty(),
              Emission::Error(err) => Producer::error(err),
            }
          }
        };
        outcome.produce(subscriber, scheduler)
      });
    }
    self.lift(move || {
      Arc::new(HandleProcessor { stage: Stage::default(), handler: handler.clone() })
    })
  }
}

pub(crate) struct HandleProcessor<T, R> {
  stage: Stage<R>,
  handler: Handler<T, R>,
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<T> for HandleProcessor<T, R> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    if self.stage.is_done() {
      return;
    }
    let mut sink = SynchronousSink::new();
    (self.handler)(item, &mut sink);
    match sink.finish() {
      Emission::Next(value) => self.stage.next(value),
      Emission::Complete => {
        self.stage.cancel_upstream();
        self.stage.complete();
      }
      Emission::Error(err) => {
        self.stage.cancel_upstream();
        self.stage.error(err);
      }
    }
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl_passthrough_subscription!([T: Send + 'static, R: Send + 'static] HandleProcessor<T, R>);
impl_processor!([T: Send + 'static, R: Send + 'static] HandleProcessor<T, R>, T => R);
