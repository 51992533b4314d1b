//! Errors delivered through the `on_error` channel.
//!
//! Every failure the runtime produces is an ordinary terminal signal, so it can
//! be recovered downstream with `on_error_return`, `on_error_map` or
//! `on_error_resume`. User errors travel as [`Error::Custom`].

use std::{fmt, sync::Arc};

use thiserror::Error as ThisError;

/// Result alias used by the blocking bridges.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, ThisError)]
pub enum Error {
  /// Raised by [`OverflowStrategy::Error`](crate::sink::OverflowStrategy)
  /// when an item arrives while downstream demand is exhausted.
  #[error("downstream is unable to keep up")]
  DownstreamUnableToKeepUp,
  /// A `generate` or `handle` callback returned without touching its sink.
  #[error("no emissions received on the synchronous sink, expected exactly one")]
  NoEmissionOnSynchronousSink,
  /// A blocking bridge saw no terminal signal before its deadline.
  #[error("timeout")]
  Timeout,
  /// A single-subscription source was subscribed a second time.
  #[error("source supports a single subscription")]
  AlreadySubscribed,
  #[error(transparent)]
  Custom(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
  /// Wraps any error value.
  pub fn custom<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Custom(Arc::new(err))
  }

  /// An error carrying only a message.
  pub fn msg(msg: impl Into<String>) -> Self { Error::Custom(Arc::new(Message(msg.into()))) }

  pub fn is_timeout(&self) -> bool { matches!(self, Error::Timeout) }
}

impl fmt::Debug for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::DownstreamUnableToKeepUp => f.write_str("DownstreamUnableToKeepUp"),
      Error::NoEmissionOnSynchronousSink => f.write_str("NoEmissionOnSynchronousSink"),
      Error::Timeout => f.write_str("Timeout"),
      Error::AlreadySubscribed => f.write_str("AlreadySubscribed"),
      Error::Custom(err) => write!(f, "Custom({err})"),
    }
  }
}

impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Error::Custom(a), Error::Custom(b)) => Arc::ptr_eq(a, b) || a.to_string() == b.to_string(),
      (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
    }
  }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl std::error::Error for Message {}
