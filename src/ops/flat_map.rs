//! FlatMap operator
//!
//! Maps every item to an inner publisher and merges what the inner
//! publishers emit. The outer stream is requested unbounded, each inner one
//! item at a time: an inner item is buffered until downstream demand allows
//! it out, and only then is the next item requested from that inner.

use std::{
  collections::{HashMap, VecDeque},
  sync::{Arc, Mutex, Weak},
};

use super::stage::{impl_processor, Stage};
use crate::{
  error::Error,
  publisher::{BoxedPublisher, Producer},
  scheduler::ArcScheduler,
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription, UNBOUNDED},
  util::lock,
};

pub(crate) type InnerMapper<T, R> = Arc<dyn Fn(T) -> BoxedPublisher<R> + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Inner publishers are subscribed on `scheduler`, or each on a fresh
  /// worker with `None`.
  pub(crate) fn flat_map<R: Send + 'static>(
    &self,
    mapper: InnerMapper<T, R>,
    scheduler: Option<ArcScheduler>,
  ) -> Producer<R> {
    if let Some(scalar) = self.scalar().cloned() {
      return Producer::new(move |subscriber, default| match scalar.try_get() {
        Some(item) => mapper(item).subscribe_on(subscriber, scheduler.clone().or(default)),
        None => Producer::<R>::empty().produce(subscriber, default),
      });
    }
    self.lift(move || FlatMapProcessor::new(mapper.clone(), scheduler.clone()))
  }
}

struct FlatMapState<R> {
  /// Items waiting for demand, tagged with the inner that produced them.
  queue: VecDeque<(R, usize)>,
  /// Open inners. The subscription is `None` until the inner subscribed.
  inners: HashMap<usize, Option<ArcSubscription>>,
  next_index: usize,
  requested: u64,
  outer_done: bool,
  terminated: bool,
  draining: bool,
  missed: bool,
}

enum Step<R> {
  Emit(R, Option<ArcSubscription>),
  Complete,
}

pub(crate) struct FlatMapProcessor<T, R> {
  stage: Stage<R>,
  mapper: InnerMapper<T, R>,
  scheduler: Option<ArcScheduler>,
  state: Mutex<FlatMapState<R>>,
  me: Weak<FlatMapProcessor<T, R>>,
}

impl<T: Send + 'static, R: Send + 'static> FlatMapProcessor<T, R> {
  fn new(mapper: InnerMapper<T, R>, scheduler: Option<ArcScheduler>) -> Arc<Self> {
    Arc::new_cyclic(|me| FlatMapProcessor {
      me: me.clone(),
      stage: Stage::default(),
      mapper,
      scheduler,
      state: Mutex::new(FlatMapState {
        queue: VecDeque::new(),
        inners: HashMap::new(),
        next_index: 0,
        requested: 0,
        outer_done: false,
        terminated: false,
        draining: false,
        missed: false,
      }),
    })
  }

  fn inner_subscribed(&self, index: usize, subscription: ArcSubscription) {
    let accepted = {
      let mut state = lock(&self.state);
      let terminated = state.terminated;
      match state.inners.get_mut(&index) {
        Some(slot) if !terminated => {
          *slot = Some(subscription.clone());
          true
        }
        _ => false,
      }
    };
    if accepted {
      subscription.request(1);
    } else {
      subscription.cancel();
    }
  }

  fn inner_next(&self, index: usize, item: R) {
    {
      let mut state = lock(&self.state);
      if state.terminated {
        return;
      }
      state.queue.push_back((item, index));
    }
    self.drain();
  }

  fn inner_complete(&self, index: usize) {
    lock(&self.state).inners.remove(&index);
    self.drain();
  }

  /// Terminates with `err`, cancelling the outer stream and every inner.
  fn fail(&self, err: Error) {
    let inners = {
      let mut state = lock(&self.state);
      if state.terminated {
        return;
      }
      state.terminated = true;
      state.queue.clear();
      state.inners.drain().filter_map(|(_, s)| s).collect::<Vec<_>>()
    };
    inners.iter().for_each(|s| s.cancel());
    self.stage.cancel_upstream();
    self.stage.error(err);
  }

  /// Moves buffered items downstream while demand lasts. One thread drains
  /// at a time; a signal arriving meanwhile marks the pass as missed and the
  /// draining thread loops again.
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
      let step = {
        let mut state = lock(&self.state);
        if state.terminated {
          state.draining = false;
          return;
        }
        let ready = if state.requested > 0 { state.queue.pop_front() } else { None };
        if let Some((item, index)) = ready {
          if state.requested != UNBOUNDED {
            state.requested -= 1;
          }
          Step::Emit(item, state.inners.get(&index).cloned().flatten())
        } else if state.outer_done && state.inners.is_empty() && state.queue.is_empty() {
          state.terminated = true;
          state.draining = false;
          Step::Complete
        } else if state.missed {
          state.missed = false;
          continue;
        } else {
          state.draining = false;
          return;
        }
      };
      match step {
        Step::Emit(item, inner) => {
          self.stage.next(item);
          if let Some(inner) = inner {
            inner.request(1);
          }
        }
        Step::Complete => {
          self.stage.complete();
          return;
        }
      }
    }
  }
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<T> for FlatMapProcessor<T, R> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    if self.stage.set_upstream(subscription.clone()) {
      subscription.request(UNBOUNDED);
    }
  }

  fn on_next(&self, item: T) {
    let index = {
      let mut state = lock(&self.state);
      if state.terminated {
        return;
      }
      let index = state.next_index;
      state.next_index += 1;
      state.inners.insert(index, None);
      index
    };
    let inner = Arc::new(InnerSubscriber { parent: self.me.clone(), index });
    (self.mapper)(item).subscribe_on(inner, self.scheduler.clone());
  }

  fn on_complete(&self) {
    lock(&self.state).outer_done = true;
    self.drain();
  }

  fn on_error(&self, err: Error) { self.fail(err) }
}

impl<T: Send + 'static, R: Send + 'static> Subscription for FlatMapProcessor<T, R> {
  fn request(&self, n: u64) {
    {
      let mut state = lock(&self.state);
      state.requested = if n == UNBOUNDED { UNBOUNDED } else { state.requested.saturating_add(n) };
    }
    self.drain();
  }

  fn cancel(&self) {
    let inners = {
      let mut state = lock(&self.state);
      state.terminated = true;
      state.queue.clear();
      state.inners.drain().filter_map(|(_, s)| s).collect::<Vec<_>>()
    };
    inners.iter().for_each(|s| s.cancel());
    self.stage.cancel();
  }
}

impl_processor!([T: Send + 'static, R: Send + 'static] FlatMapProcessor<T, R>, T => R);

struct InnerSubscriber<T, R> {
  parent: Weak<FlatMapProcessor<T, R>>,
  index: usize,
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<R> for InnerSubscriber<T, R> {
  fn on_subscribe(&self, subscription: ArcSubscription) {
    match self.parent.upgrade() {
      Some(parent) => parent.inner_subscribed(self.index, subscription),
      None => subscription.cancel(),
    }
  }

  fn on_next(&self, item: R) {
    if let Some(parent) = self.parent.upgrade() {
      parent.inner_next(self.index, item);
    }
  }

  fn on_complete(&self) {
    if let Some(parent) = self.parent.upgrade() {
      parent.inner_complete(self.index);
    }
  }

  fn on_error(&self, err: Error) {
    if let Some(parent) = self.parent.upgrade() {
      parent.fail(err);
    }
  }
}
