use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Mutex,
};

use crate::{
  error::Error,
  subscriber::ArcSubscriber,
  subscription::{ArcSubscription, UNBOUNDED},
  util::lock,
};

/// The state every operator stage shares: its downstream subscriber and its
/// upstream subscription, each behind its own lock, plus a terminal latch.
///
/// Emissions hold the downstream lock so signals reach the subscriber
/// serialized. Once the latch is set nothing more is forwarded.
pub(crate) struct Stage<R> {
  downstream: Mutex<Option<ArcSubscriber<R>>>,
  upstream: Mutex<Upstream>,
  done: AtomicBool,
}

#[derive(Default)]
struct Upstream {
  current: Option<ArcSubscription>,
  first: Option<ArcSubscription>,
}

impl<R> Default for Stage<R> {
  fn default() -> Self {
    Stage {
      downstream: Mutex::new(None),
      upstream: Mutex::new(Upstream::default()),
      done: AtomicBool::new(false),
    }
  }
}

impl<R> Stage<R> {
  pub(crate) fn bind(&self, downstream: ArcSubscriber<R>) {
    let mut slot = lock(&self.downstream);
    if slot.is_none() && !self.is_done() {
      *slot = Some(downstream);
    }
  }

  /// Installs `upstream`, returning whether it is new to this stage.
  ///
  /// Handing over the current handle again is a no-op, and so is handing
  /// over the first handle after a stage switched to another one (a
  /// concatenation or a fallback). A stage that already terminated cancels
  /// any upstream handed to it.
  pub(crate) fn set_upstream(&self, upstream: ArcSubscription) -> bool {
    if self.is_done() {
      upstream.cancel();
      return false;
    }
    let mut slot = lock(&self.upstream);
    let seen =
      |held: &Option<ArcSubscription>| matches!(held, Some(s) if Arc::ptr_eq(s, &upstream));
    if seen(&slot.current) || seen(&slot.first) {
      return false;
    }
    if slot.first.is_none() {
      slot.first = Some(upstream.clone());
    }
    slot.current = Some(upstream);
    true
  }

  pub(crate) fn upstream(&self) -> Option<ArcSubscription> { lock(&self.upstream).current.clone() }

  pub(crate) fn request_upstream(&self, n: u64) {
    if let Some(upstream) = self.upstream() {
      upstream.request(n);
    }
  }

  pub(crate) fn cancel_upstream(&self) {
    if let Some(upstream) = self.upstream() {
      upstream.cancel();
    }
  }

  pub(crate) fn is_done(&self) -> bool { self.done.load(Ordering::SeqCst) }

  pub(crate) fn next(&self, item: R) {
    if self.is_done() {
      return;
    }
    if let Some(downstream) = &*lock(&self.downstream) {
      downstream.on_next(item);
    }
  }

  pub(crate) fn complete(&self) { self.finish(None) }

  pub(crate) fn error(&self, err: Error) {
    if let Some(downstream) = self.latch() {
      downstream.on_error(err);
    }
  }

  /// Emits `last`, if any, then completes.
  pub(crate) fn finish(&self, last: Option<R>) {
    if let Some(downstream) = self.latch() {
      if let Some(item) = last {
        downstream.on_next(item);
      }
      downstream.on_complete();
    }
  }

  /// Stops forwarding and cancels upstream, for a downstream cancel. Leaves
  /// the downstream lock alone, since cancel is often called from inside an
  /// emission.
  pub(crate) fn cancel(&self) {
    self.done.store(true, Ordering::SeqCst);
    self.cancel_upstream();
  }

  /// Sets the latch and takes the downstream, waiting out an emission in
  /// progress. Only the first caller gets the subscriber.
  fn latch(&self) -> Option<ArcSubscriber<R>> {
    if self.done.swap(true, Ordering::SeqCst) {
      return None;
    }
    lock(&self.downstream).take()
  }
}

/// Downstream demand bookkeeping for a stage that finishes with one item of
/// its own: the trailing item goes out right away when demand is left, or is
/// parked until the next request.
pub(crate) struct Trailer<R> {
  state: Mutex<(u64, Option<R>)>,
}

impl<R> Default for Trailer<R> {
  fn default() -> Self { Trailer { state: Mutex::new((0, None)) } }
}

impl<R> Trailer<R> {
  /// Records a request, returning the parked item if it may go out now.
  pub(crate) fn request(&self, n: u64) -> Option<R> {
    let mut state = lock(&self.state);
    state.0 = if n == UNBOUNDED { UNBOUNDED } else { state.0.saturating_add(n) };
    state.1.take()
  }

  /// Records an item forwarded downstream.
  pub(crate) fn consumed(&self) {
    let mut state = lock(&self.state);
    if state.0 != UNBOUNDED {
      state.0 = state.0.saturating_sub(1);
    }
  }

  /// Hands `item` back when demand is left, otherwise parks it.
  pub(crate) fn offer(&self, item: R) -> Option<R> {
    let mut state = lock(&self.state);
    if state.0 > 0 {
      Some(item)
    } else {
      state.1 = Some(item);
      None
    }
  }
}

/// Implements [`Processor`](crate::publisher::Processor) for a type holding a
/// `stage: Stage<_>` field.
macro_rules! impl_processor {
  ([$($g:tt)*] $ty:ty, $in:ty => $out:ty) => {
    impl<$($g)*> crate::publisher::Processor<$in, $out> for $ty {
      fn bind(
        self: std::sync::Arc<Self>,
        downstream: crate::subscriber::ArcSubscriber<$out>,
      ) -> crate::subscription::ArcSubscription {
        self.stage.bind(downstream);
        self
      }
    }
  };
}

/// Implements a demand pass-through [`Subscription`] for a type holding a
/// `stage: Stage<_>` field.
macro_rules! impl_passthrough_subscription {
  ([$($g:tt)*] $ty:ty) => {
    impl<$($g)*> crate::subscription::Subscription for $ty {
      fn request(&self, n: u64) { self.stage.request_upstream(n) }

      fn cancel(&self) { self.stage.cancel() }
    }
  };
}

pub(crate) use impl_passthrough_subscription;
pub(crate) use impl_processor;
