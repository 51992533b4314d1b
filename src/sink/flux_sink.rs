use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use once_cell::sync::OnceCell;

use super::OverflowStrategy;
use crate::{
  error::Error,
  scheduler::ArcCancellable,
  signal::Signal,
  subscriber::ArcSubscriber,
  subscription::{Demand, Subscription},
  util::lock,
};

type Callback = Box<dyn FnOnce() + Send>;
type RequestCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// The push handle `Flux::create` hands to user code.
///
/// It can be cloned and moved to other threads. Emissions past the current
/// demand are governed by the [`OverflowStrategy`] the stream was created with.
pub struct FluxSink<T> {
  core: Arc<SinkCore<T>>,
}

impl<T> Clone for FluxSink<T> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<T: Send + 'static> FluxSink<T> {
  pub(crate) fn new(core: Arc<SinkCore<T>>) -> Self { Self { core } }

  pub fn next(&self, item: T) { self.core.next(item) }

  pub fn complete(&self) { self.core.terminate(Signal::OnComplete) }

  pub fn error(&self, err: Error) { self.core.terminate(Signal::OnError(err)) }

  pub fn is_cancelled(&self) -> bool { self.core.demand.is_cancelled() }

  /// Outstanding downstream demand, `UNBOUNDED` once unbounded.
  pub fn requested_from_downstream(&self) -> u64 { self.core.demand.requested() }

  /// Runs `f` when the subscriber cancels; immediately if it already did.
  pub fn on_cancel(&self, f: impl FnOnce() + Send + 'static) -> &Self {
    self.core.on_cancel(Box::new(f));
    self
  }

  /// Runs `f` once, on the first terminal signal or cancellation; immediately
  /// if that already happened.
  pub fn on_dispose(&self, f: impl FnOnce() + Send + 'static) -> &Self {
    self.core.on_dispose(Box::new(f));
    self
  }

  /// Runs `f` for every downstream request. Registration replays the total
  /// requested so far, if any.
  pub fn on_request(&self, f: impl Fn(u64) + Send + Sync + 'static) -> &Self {
    self.core.on_request(Arc::new(f));
    self
  }
}

pub(crate) struct SinkCore<T> {
  strategy: OverflowStrategy,
  subscriber: ArcSubscriber<T>,
  demand: Demand,
  state: Mutex<SinkState<T>>,
  emitting: Mutex<()>,
}

struct SinkState<T> {
  queue: VecDeque<Signal<T>>,
  draining: bool,
  missed: bool,
  terminated: bool,
  closed: bool,
  requested_total: u64,
  on_request: Option<RequestCallback>,
  on_cancel: Option<Callback>,
  on_dispose: Option<Callback>,
  disposed: bool,
}

impl<T: Send + 'static> SinkCore<T> {
  pub(crate) fn new(strategy: OverflowStrategy, subscriber: ArcSubscriber<T>) -> Self {
    SinkCore {
      strategy,
      subscriber,
      demand: Demand::new(),
      state: Mutex::new(SinkState {
        queue: VecDeque::new(),
        draining: false,
        missed: false,
        terminated: false,
        closed: false,
        requested_total: 0,
        on_request: None,
        on_cancel: None,
        on_dispose: None,
        disposed: false,
      }),
      emitting: Mutex::new(()),
    }
  }

  fn next(&self, item: T) {
    if self.demand.is_cancelled() || lock(&self.state).terminated {
      return;
    }
    match self.strategy {
      OverflowStrategy::Buffer => {
        lock(&self.state).queue.push_back(Signal::OnNext(item));
        self.drain();
      }
      OverflowStrategy::Ignore => {
        let _emitting = lock(&self.emitting);
        if self.is_open() {
          self.demand.try_acquire();
          self.subscriber.on_next(item);
        }
      }
      OverflowStrategy::Drop => {
        let _emitting = lock(&self.emitting);
        if !self.is_open() {
          return;
        }
        if self.demand.try_acquire() {
          self.subscriber.on_next(item);
        } else {
          log::debug!("no demand, dropping item");
        }
      }
      OverflowStrategy::Error => {
        let _emitting = lock(&self.emitting);
        if !self.is_open() {
          return;
        }
        if self.demand.try_acquire() {
          self.subscriber.on_next(item);
        } else {
          let first = {
            let mut state = lock(&self.state);
            let first = !state.terminated;
            state.terminated = true;
            state.closed = true;
            first
          };
          if first {
            log::debug!("no demand left, failing the stream");
            self.subscriber.on_error(Error::DownstreamUnableToKeepUp);
            self.dispose();
          }
        }
      }
    }
  }

  /// Whether direct emissions may still go out. Checked under `emitting`,
  /// since a terminal signal may have been delivered while this thread
  /// waited for it.
  fn is_open(&self) -> bool { !self.demand.is_cancelled() && !lock(&self.state).closed }

  fn terminate(&self, signal: Signal<T>) {
    {
      let mut state = lock(&self.state);
      if state.terminated || self.demand.is_cancelled() {
        return;
      }
      state.terminated = true;
      if self.strategy == OverflowStrategy::Buffer {
        state.queue.push_back(signal);
        drop(state);
        self.dispose();
        self.drain();
        return;
      }
      state.closed = true;
    }
    {
      let _emitting = lock(&self.emitting);
      if !self.demand.is_cancelled() {
        signal.accept(&*self.subscriber);
      }
    }
    self.dispose();
  }

  /// Delivers queued signals while demand allows. Whoever finds the drain
  /// already running leaves a `missed` mark for the running drain to pick up,
  /// so emissions never overlap and re-entrant requests cannot deadlock.
  fn drain(&self) {
    {
      let mut state = lock(&self.state);
      if state.draining {
        state.missed = true;
        return;
      }
      state.draining = true;
    }
    loop {
      let signal = {
        let mut state = lock(&self.state);
        if self.demand.is_cancelled() || state.closed {
          state.queue.clear();
          state.draining = false;
          return;
        }
        let ready = match state.queue.front() {
          Some(Signal::OnNext(_)) => self.demand.try_acquire(),
          Some(_) => true,
          None => false,
        };
        if ready {
          state.queue.pop_front()
        } else if state.missed {
          state.missed = false;
          continue;
        } else {
          state.draining = false;
          return;
        }
      };
      if let Some(signal) = signal {
        if signal.is_terminal() {
          lock(&self.state).closed = true;
        }
        signal.accept(&*self.subscriber);
      }
    }
  }

  fn request(&self, n: u64) {
    if !self.demand.request(n) {
      return;
    }
    let callback = {
      let mut state = lock(&self.state);
      state.requested_total = state.requested_total.saturating_add(n);
      state.on_request.clone()
    };
    if let Some(callback) = callback {
      callback(n);
    }
    if self.strategy == OverflowStrategy::Buffer {
      self.drain();
    }
  }

  pub(crate) fn cancel(&self) {
    if !self.demand.cancel() {
      return;
    }
    let callback = {
      let mut state = lock(&self.state);
      state.queue.clear();
      state.on_cancel.take()
    };
    if let Some(callback) = callback {
      callback();
    }
    self.dispose();
  }

  fn dispose(&self) {
    let callback = {
      let mut state = lock(&self.state);
      if state.disposed {
        return;
      }
      state.disposed = true;
      state.on_dispose.take()
    };
    if let Some(callback) = callback {
      callback();
    }
  }

  fn on_cancel(&self, f: Callback) {
    if self.demand.is_cancelled() {
      return f();
    }
    lock(&self.state).on_cancel = Some(f);
  }

  fn on_dispose(&self, f: Callback) {
    {
      let mut state = lock(&self.state);
      if !state.disposed {
        state.on_dispose = Some(f);
        return;
      }
    }
    f()
  }

  fn on_request(&self, f: RequestCallback) {
    let replay = {
      let mut state = lock(&self.state);
      state.on_request = Some(f.clone());
      state.requested_total
    };
    if replay > 0 {
      f(replay);
    }
  }
}

/// The subscription of a `create` source.
pub(crate) struct SinkSubscription<T> {
  core: Arc<SinkCore<T>>,
  task: OnceCell<ArcCancellable>,
}

impl<T: Send + 'static> SinkSubscription<T> {
  pub(crate) fn new(core: Arc<SinkCore<T>>) -> Self { Self { core, task: OnceCell::new() } }

  pub(crate) fn attach(&self, task: ArcCancellable) {
    let _ = self.task.set(task);
    if self.core.demand.is_cancelled() {
      if let Some(task) = self.task.get() {
        task.cancel();
      }
    }
  }
}

impl<T: Send + 'static> Subscription for SinkSubscription<T> {
  fn request(&self, n: u64) { self.core.request(n) }

  fn cancel(&self) {
    self.core.cancel();
    if let Some(task) = self.task.get() {
      task.cancel();
    }
  }
}
