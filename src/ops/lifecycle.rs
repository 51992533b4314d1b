//! Lifecycle operators: the `do_*` taps and `log`
//!
//! Each tap observes one kind of event and passes every signal through
//! untouched. Terminal taps fire at most once per subscription, `do_finally`
//! fires once after a terminal signal or a cancel, whichever comes first.

use std::{
  fmt::Debug,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use super::stage::{impl_processor, Stage};
use crate::{
  error::Error,
  publisher::Producer,
  signal::Signal,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription},
};

type Hook = Arc<dyn Fn() + Send + Sync>;

/// The callbacks one `do_*` stage fires. Unset hooks are skipped.
pub(crate) struct Hooks<T> {
  pub(crate) on_subscribe: Option<Arc<dyn Fn(&ArcSubscription) + Send + Sync>>,
  pub(crate) on_request: Option<Arc<dyn Fn(u64) + Send + Sync>>,
  pub(crate) on_next: Option<Arc<dyn Fn(&T) + Send + Sync>>,
  pub(crate) on_error: Option<Arc<dyn Fn(&Error) + Send + Sync>>,
  pub(crate) on_complete: Option<Hook>,
  pub(crate) on_cancel: Option<Hook>,
  pub(crate) on_terminate: Option<Hook>,
  pub(crate) after_terminate: Option<Hook>,
  pub(crate) on_finally: Option<Hook>,
}

impl<T> Default for Hooks<T> {
  fn default() -> Self {
    Hooks {
      on_subscribe: None,
      on_request: None,
      on_next: None,
      on_error: None,
      on_complete: None,
      on_cancel: None,
      on_terminate: None,
      after_terminate: None,
      on_finally: None,
    }
  }
}

impl<T> Clone for Hooks<T> {
  fn clone(&self) -> Self {
    Hooks {
      on_subscribe: self.on_subscribe.clone(),
      on_request: self.on_request.clone(),
      on_next: self.on_next.clone(),
      on_error: self.on_error.clone(),
      on_complete: self.on_complete.clone(),
      on_cancel: self.on_cancel.clone(),
      on_terminate: self.on_terminate.clone(),
      after_terminate: self.after_terminate.clone(),
      on_finally: self.on_finally.clone(),
    }
  }
}

fn fire(hook: &Option<Hook>) {
  if let Some(f) = hook {
    f()
  }
}

impl<T: Send + 'static> Producer<T> {
  /// Attaches `hooks` to every subscription. Taps are plain stages, so they
  /// give up the scalar fast path of the stream they observe.
  pub(crate) fn peek(&self, hooks: Hooks<T>) -> Producer<T> {
    self.lift(move || {
      Arc::new(DoProcessor {
        stage: Stage::default(),
        hooks: hooks.clone(),
        terminated: AtomicBool::new(false),
        cancelled: AtomicBool::new(false),
        finalized: AtomicBool::new(false),
      })
    })
  }

  pub(crate) fn do_on_each(&self, f: Arc<dyn Fn(Signal<T>) + Send + Sync>) -> Producer<T>
  where
    T: Clone,
  {
    let (next, error, complete) = (f.clone(), f.clone(), f);
    self.peek(Hooks {
      on_next: Some(Arc::new(move |item: &T| next(Signal::OnNext(item.clone())))),
      on_error: Some(Arc::new(move |err: &Error| error(Signal::OnError(err.clone())))),
      on_complete: Some(Arc::new(move || complete(Signal::OnComplete))),
      ..Hooks::default()
    })
  }

  /// Records every event as an `info` line under `target`.
  pub(crate) fn log(&self, target: impl Into<String>) -> Producer<T>
  where
    T: Debug,
  {
    let target: Arc<str> = Arc::from(target.into());
    let (t1, t2, t3, t4, t5, t6) =
      (target.clone(), target.clone(), target.clone(), target.clone(), target.clone(), target);
    self.peek(Hooks {
      on_subscribe: Some(Arc::new(move |_: &ArcSubscription| {
        log::info!(target: &*t1, "Subscribed")
      })),
      on_request: Some(Arc::new(move |n| log::info!(target: &*t2, "Request: {}", n))),
      on_next: Some(Arc::new(move |item: &T| log::info!(target: &*t3, "Next: {:?}", item))),
      on_complete: Some(Arc::new(move || log::info!(target: &*t4, "Complete"))),
      on_error: Some(Arc::new(move |err: &Error| log::info!(target: &*t5, "Error: {}", err))),
      on_cancel: Some(Arc::new(move || log::info!(target: &*t6, "Cancel"))),
      ..Hooks::default()
    })
  }
}

pub(crate) struct DoProcessor<T> {
  stage: Stage<T>,
  hooks: Hooks<T>,
  terminated: AtomicBool,
  cancelled: AtomicBool,
  finalized: AtomicBool,
}

impl<T> DoProcessor<T> {
  fn finally(&self) {
    if !self.finalized.swap(true, Ordering::SeqCst) {
      fire(&self.hooks.on_finally);
    }
  }

  /// Runs the terminal hooks around `deliver`, once.
  fn terminate(&self, before: impl FnOnce(), deliver: impl FnOnce()) {
    if self.terminated.swap(true, Ordering::SeqCst) {
      return;
    }
    before();
    fire(&self.hooks.on_terminate);
    deliver();
    fire(&self.hooks.after_terminate);
    self.finally();
  }
}

impl<T: Send + 'static> Subscriber<T> for DoProcessor<T> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    if self.stage.set_upstream(subscription.clone()) {
      if let Some(f) = &self.hooks.on_subscribe {
        f(&subscription);
      }
    }
  }

  fn on_next(&self, item: T) {
    if self.stage.is_done() {
      return;
    }
    if let Some(f) = &self.hooks.on_next {
      f(&item);
    }
    self.stage.next(item);
  }

  fn on_complete(&self) {
    self.terminate(|| fire(&self.hooks.on_complete), || self.stage.complete());
  }

  fn on_error(&self, err: Error) {
    let hook = self.hooks.on_error.clone();
    let c_err = err.clone();
    self.terminate(
      move || {
        if let Some(f) = hook {
          f(&c_err);
        }
      },
      || self.stage.error(err),
    );
  }
}

impl<T: Send + 'static> Subscription for DoProcessor<T> {
  fn request(&self, n: u64) {
    if let Some(f) = &self.hooks.on_request {
      f(n);
    }
    self.stage.request_upstream(n);
  }

  fn cancel(&self) {
    if self.cancelled.swap(true, Ordering::SeqCst) {
      return;
    }
    if !self.terminated.load(Ordering::SeqCst) {
      fire(&self.hooks.on_cancel);
    }
    self.stage.cancel();
    self.finally();
  }
}

impl_processor!([T: Send + 'static] DoProcessor<T>, T => T);
