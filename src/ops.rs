//! Operator stages. Each module adds its operator to
//! [`Producer`](crate::publisher::Producer); [`Flux`](crate::flux::Flux) and
//! [`Mono`](crate::mono::Mono) expose them with their own return types.

pub(crate) mod all_any;
pub(crate) mod concat;
pub(crate) mod count;
pub(crate) mod distinct_until_changed;
pub(crate) mod filter;
pub(crate) mod flat_map;
pub(crate) mod handle;
pub mod into_stream;
pub(crate) mod lifecycle;
pub(crate) mod map;
pub(crate) mod materialize;
pub(crate) mod on_error;
pub(crate) mod on_error_resume;
pub(crate) mod reduce;
pub(crate) mod scan;
pub(crate) mod stage;
pub(crate) mod take;

/// The operators `Flux` and `Mono` share, each returning the wrapper it was
/// called on.
macro_rules! shared_operators {
  ($wrapper:ident) => {
    /// Keeps the items `predicate` accepts.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.filter(std::sync::Arc::new(predicate)))
    }

    pub fn map<R: Send + 'static>(
      &self,
      mapper: impl Fn(T) -> R + Send + Sync + 'static,
    ) -> $wrapper<R> {
      $wrapper(self.0.map(std::sync::Arc::new(mapper)))
    }

    /// Runs `handler` per item with a single-shot sink: whatever it calls
    /// first (`next`, `complete` or `error`) decides what the item becomes.
    /// Calling nothing fails the stream with
    /// [`Error::NoEmissionOnSynchronousSink`](crate::error::Error).
    pub fn handle<R: Send + 'static>(
      &self,
      handler: impl Fn(T, &mut crate::sink::SynchronousSink<R>) + Send + Sync + 'static,
    ) -> $wrapper<R> {
      $wrapper(self.0.handle(std::sync::Arc::new(handler)))
    }

    pub fn on_error_return(&self, fallback: T) -> $wrapper<T>
    where
      T: Clone + Sync,
    {
      $wrapper(self.0.on_error_return(fallback))
    }

    pub fn on_error_map(
      &self,
      mapper: impl Fn(crate::error::Error) -> crate::error::Error + Send + Sync + 'static,
    ) -> $wrapper<T> {
      $wrapper(self.0.on_error_map(std::sync::Arc::new(mapper)))
    }

    /// Continues with the publisher `fallback` builds from the first error.
    pub fn on_error_resume<P>(
      &self,
      fallback: impl Fn(crate::error::Error) -> P + Send + Sync + 'static,
    ) -> $wrapper<T>
    where
      P: crate::publisher::Publisher<T> + 'static,
    {
      self.on_error_resume_when(|_| true, fallback)
    }

    /// Like `on_error_resume`, for errors `predicate` accepts only.
    pub fn on_error_resume_when<P>(
      &self,
      predicate: impl Fn(&crate::error::Error) -> bool + Send + Sync + 'static,
      fallback: impl Fn(crate::error::Error) -> P + Send + Sync + 'static,
    ) -> $wrapper<T>
    where
      P: crate::publisher::Publisher<T> + 'static,
    {
      $wrapper(self.0.on_error_resume(
        std::sync::Arc::new(predicate),
        std::sync::Arc::new(move |err| {
          std::sync::Arc::new(fallback(err)) as crate::publisher::BoxedPublisher<T>
        }),
      ))
    }

    pub fn do_on_subscribe(
      &self,
      f: impl Fn(&crate::subscription::ArcSubscription) + Send + Sync + 'static,
    ) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_subscribe: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    pub fn do_on_request(&self, f: impl Fn(u64) + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_request: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    pub fn do_on_next(&self, f: impl Fn(&T) + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_next: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    pub fn do_on_error(
      &self,
      f: impl Fn(&crate::error::Error) + Send + Sync + 'static,
    ) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_error: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    pub fn do_on_complete(&self, f: impl Fn() + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_complete: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    /// Fires before the terminal signal, complete or error, is forwarded.
    pub fn do_on_terminate(&self, f: impl Fn() + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_terminate: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    /// Fires after the terminal signal was forwarded.
    pub fn do_after_terminate(&self, f: impl Fn() + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        after_terminate: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    /// Fires once per subscription, after termination or cancellation.
    pub fn do_finally(&self, f: impl Fn() + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_finally: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    /// Fires on the first downstream cancel of a subscription that has not
    /// terminated.
    pub fn do_on_cancel(&self, f: impl Fn() + Send + Sync + 'static) -> $wrapper<T> {
      $wrapper(self.0.peek(crate::ops::lifecycle::Hooks {
        on_cancel: Some(std::sync::Arc::new(f)),
        ..Default::default()
      }))
    }

    /// Sees every item and the terminal event as a [`Signal`](crate::signal::Signal).
    pub fn do_on_each(
      &self,
      f: impl Fn(crate::signal::Signal<T>) + Send + Sync + 'static,
    ) -> $wrapper<T>
    where
      T: Clone,
    {
      $wrapper(self.0.do_on_each(std::sync::Arc::new(f)))
    }

    /// Logs every event at `info` level under `target`.
    pub fn log(&self, target: impl Into<String>) -> $wrapper<T>
    where
      T: std::fmt::Debug,
    {
      $wrapper(self.0.log(target))
    }

    pub fn into_stream(&self) -> crate::ops::into_stream::IntoStream<T> { self.0.into_stream() }

    pub fn into_boxed(self) -> crate::publisher::BoxedPublisher<T> { std::sync::Arc::new(self) }

    /// Subscribes with closures and unbounded demand.
    pub fn subscribe_with_fns(
      &self,
      next: impl Fn(T) + Send + Sync + 'static,
      error: impl Fn(crate::error::Error) + Send + Sync + 'static,
      complete: impl Fn() + Send + Sync + 'static,
    ) -> crate::subscription::ArcSubscription {
      self.0.produce(
        std::sync::Arc::new(crate::subscriber::LambdaSubscriber::new(next, error, complete)),
        None,
      )
    }
  };
}

pub(crate) use shared_operators;
