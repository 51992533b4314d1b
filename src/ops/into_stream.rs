//! IntoStream Operator
//!
//! Bridges a [`Flux`](crate::flux::Flux) or [`Mono`](crate::mono::Mono) into a
//! `futures::Stream`, so its items can be consumed with `.await`.
//!
//! Demand follows the consumer: polling an empty stream requests one item
//! from upstream, and nothing more is requested until that item was taken.
//!
//! # Example
//!
//! ```rust
//! use futures::{executor::block_on, StreamExt};
//! use reflux::prelude::*;
//!
//! let values: Vec<_> = block_on(Flux::from_iter(1..=3).into_stream().collect());
//! assert_eq!(values, vec![Ok(1), Ok(2), Ok(3)]);
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  sync::{Arc, Mutex},
  task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{
  error::Error,
  publisher::Producer,
  subscriber::Subscriber,
  subscription::ArcSubscription,
  util::lock,
};

/// State shared between the subscriber side and the polling side.
struct IntoStreamState<T> {
  queue: VecDeque<Result<T, Error>>,
  waker: Option<Waker>,
  /// A requested item has not arrived yet.
  in_flight: bool,
  is_closed: bool,
}

/// A `Stream` of the items of one subscription.
///
/// - `Ok(T)` for each item.
/// - `Err(Error)` once, when upstream signals an error.
/// - `None` after completion or after the error.
///
/// Dropping the stream cancels the subscription.
pub struct IntoStream<T> {
  state: Arc<Mutex<IntoStreamState<T>>>,
  subscription: ArcSubscription,
}

impl<T: Send + 'static> Producer<T> {
  pub(crate) fn into_stream(&self) -> IntoStream<T> {
    let state = Arc::new(Mutex::new(IntoStreamState {
      queue: VecDeque::new(),
      waker: None,
      in_flight: false,
      is_closed: false,
    }));
    let subscriber = Arc::new(IntoStreamSubscriber { state: state.clone() });
    let subscription = self.produce(subscriber, None);
    IntoStream { state, subscription }
  }
}

impl<T> Stream for IntoStream<T> {
  type Item = Result<T, Error>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let request = {
      let mut state = lock(&self.state);
      if let Some(item) = state.queue.pop_front() {
        return Poll::Ready(Some(item));
      }
      if state.is_closed {
        return Poll::Ready(None);
      }
      state.waker = Some(cx.waker().clone());
      !std::mem::replace(&mut state.in_flight, true)
    };
    if request {
      self.subscription.request(1);
    }
    Poll::Pending
  }
}

impl<T> Drop for IntoStream<T> {
  fn drop(&mut self) {
    let closed = lock(&self.state).is_closed;
    if !closed {
      self.subscription.cancel();
    }
  }
}

struct IntoStreamSubscriber<T> {
  state: Arc<Mutex<IntoStreamState<T>>>,
}

impl<T> IntoStreamSubscriber<T> {
  fn push(&self, item: Option<Result<T, Error>>) {
    let waker = {
      let mut state = lock(&self.state);
      if state.is_closed {
        return;
      }
      match item {
        Some(Ok(value)) => {
          state.in_flight = false;
          state.queue.push_back(Ok(value));
        }
        Some(Err(err)) => {
          state.queue.push_back(Err(err));
          state.is_closed = true;
        }
        None => state.is_closed = true,
      }
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<T: Send> Subscriber<T> for IntoStreamSubscriber<T> {
  /// The stream keeps the subscription handed back by the producer.
  fn on_subscribe(&self, _: ArcSubscription) {}

  fn on_next(&self, item: T) { self.push(Some(Ok(item))) }

  fn on_complete(&self) { self.push(None) }

  fn on_error(&self, err: Error) { self.push(Some(Err(err))) }
}
