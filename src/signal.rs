//! Reified subscriber events, produced by `materialize` and `do_on_each` and
//! consumed by `dematerialize`.

use std::fmt;

use crate::{error::Error, subscriber::Subscriber, subscription::ArcSubscription};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalType {
  OnSubscribe,
  OnNext,
  OnComplete,
  OnError,
}

pub enum Signal<T> {
  OnSubscribe(ArcSubscription),
  OnNext(T),
  OnComplete,
  OnError(Error),
}

impl<T> Signal<T> {
  /// Replays this signal into `subscriber`.
  pub fn accept(self, subscriber: &dyn Subscriber<T>) {
    match self {
      Signal::OnSubscribe(s) => subscriber.on_subscribe(s),
      Signal::OnNext(item) => subscriber.on_next(item),
      Signal::OnComplete => subscriber.on_complete(),
      Signal::OnError(err) => subscriber.on_error(err),
    }
  }

  pub fn signal_type(&self) -> SignalType {
    match self {
      Signal::OnSubscribe(_) => SignalType::OnSubscribe,
      Signal::OnNext(_) => SignalType::OnNext,
      Signal::OnComplete => SignalType::OnComplete,
      Signal::OnError(_) => SignalType::OnError,
    }
  }

  pub fn item(&self) -> Option<&T> {
    match self {
      Signal::OnNext(item) => Some(item),
      _ => None,
    }
  }

  pub fn into_item(self) -> Option<T> {
    match self {
      Signal::OnNext(item) => Some(item),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&Error> {
    match self {
      Signal::OnError(err) => Some(err),
      _ => None,
    }
  }

  pub fn subscription(&self) -> Option<&ArcSubscription> {
    match self {
      Signal::OnSubscribe(s) => Some(s),
      _ => None,
    }
  }

  pub fn is_on_subscribe(&self) -> bool { matches!(self, Signal::OnSubscribe(_)) }

  pub fn is_on_next(&self) -> bool { matches!(self, Signal::OnNext(_)) }

  pub fn is_on_complete(&self) -> bool { matches!(self, Signal::OnComplete) }

  pub fn is_on_error(&self) -> bool { matches!(self, Signal::OnError(_)) }

  /// Complete and error are terminal.
  pub fn is_terminal(&self) -> bool { self.is_on_complete() || self.is_on_error() }
}

impl<T: Clone> Clone for Signal<T> {
  fn clone(&self) -> Self {
    match self {
      Signal::OnSubscribe(s) => Signal::OnSubscribe(s.clone()),
      Signal::OnNext(item) => Signal::OnNext(item.clone()),
      Signal::OnComplete => Signal::OnComplete,
      Signal::OnError(err) => Signal::OnError(err.clone()),
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Signal::OnSubscribe(_) => f.write_str("OnSubscribe"),
      Signal::OnNext(item) => f.debug_tuple("OnNext").field(item).finish(),
      Signal::OnComplete => f.write_str("OnComplete"),
      Signal::OnError(err) => f.debug_tuple("OnError").field(err).finish(),
    }
  }
}

impl<T: PartialEq> PartialEq for Signal<T> {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Signal::OnSubscribe(a), Signal::OnSubscribe(b)) => std::sync::Arc::ptr_eq(a, b),
      (Signal::OnNext(a), Signal::OnNext(b)) => a == b,
      (Signal::OnComplete, Signal::OnComplete) => true,
      (Signal::OnError(a), Signal::OnError(b)) => a == b,
      _ => false,
    }
  }
}
