//! Materialize and dematerialize operators
//!
//! `materialize` turns every event into a [`Signal`] item, the terminal one
//! included, then completes. `dematerialize` replays signal items as real
//! events.

use std::{marker::PhantomData, sync::Arc};

use super::stage::{impl_passthrough_subscription, impl_processor, Stage, Trailer};
use crate::{
  error::Error,
  publisher::Producer,
  signal::Signal,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
};

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn materialize(&self) -> Producer<Signal<T>> {
    self.lift(|| {
      Arc::new(MaterializeProcessor { stage: Stage::default(), trailer: Trailer::default() })
    })
  }
}

impl<T: Send + 'static> Producer<Signal<T>> {
  pub(crate) fn dematerialize(&self) -> Producer<T> {
    self.lift(|| Arc::new(DematerializeProcessor { stage: Stage::default(), _item: PhantomData }))
  }
}

pub(crate) struct MaterializeProcessor<T> {
  stage: Stage<Signal<T>>,
  trailer: Trailer<Signal<T>>,
}

impl<T> MaterializeProcessor<T> {
  /// The terminal signal is an item too, so it waits for demand.
  fn terminal(&self, signal: Signal<T>) {
    if let Some(signal) = self.trailer.offer(signal) {
      self.stage.finish(Some(signal));
    }
  }
}

impl<T: Send + 'static> Subscriber<T> for MaterializeProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  fn on_next(&self, item: T) {
    self.trailer.consumed();
    self.stage.next(Signal::OnNext(item));
  }

  fn on_complete(&self) { self.terminal(Signal::OnComplete) }

  fn on_error(&self, err: Error) { self.terminal(Signal::OnError(err)) }
}

impl<T: Send + 'static> Subscription for MaterializeProcessor<T> {
  fn request(&self, n: u64) {
    match self.trailer.request(n) {
      Some(signal) => self.stage.finish(Some(signal)),
      None => self.stage.request_upstream(n),
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Send + 'static] MaterializeProcessor<T>, T => Signal<T>);

pub(crate) struct DematerializeProcessor<T> {
  stage: Stage<T>,
  _item: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Subscriber<Signal<T>> for DematerializeProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) { self.stage.set_upstream(subscription); }

  /// A terminal signal item ends the stream and cancels the rest; a
  /// subscribe signal carries no item, so its demand unit is asked again.
  fn on_next(&self, signal: Signal<T>) {
    match signal {
      Signal::OnNext(item) => self.stage.next(item),
      Signal::OnComplete => {
        self.stage.cancel_upstream();
        self.stage.complete();
      }
      Signal::OnError(err) => {
        self.stage.cancel_upstream();
        self.stage.error(err);
      }
      Signal::OnSubscribe(_) => self.stage.request_upstream(1),
    }
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) { self.stage.error(err) }
}

impl_passthrough_subscription!([T: Send + 'static] DematerializeProcessor<T>);
impl_processor!([T: Send + 'static] DematerializeProcessor<T>, Signal<T> => T);
