use std::sync::{Condvar, Mutex};

use super::UNBOUNDED;
use crate::util::lock;

/// Thread-safe demand accounting for one subscription.
///
/// Production loops running on a scheduler block in [`Demand::acquire`]
/// until the subscriber requests more or cancels.
#[derive(Debug, Default)]
pub struct Demand {
  state: Mutex<DemandState>,
  cond: Condvar,
}

#[derive(Debug, Default, Clone, Copy)]
struct DemandState {
  requested: u64,
  unbounded: bool,
  cancelled: bool,
}

impl Demand {
  pub fn new() -> Self { Self::default() }

  /// Records `n` more units. Returns `false` when the request was ignored
  /// because the subscription is already cancelled.
  pub fn request(&self, n: u64) -> bool {
    let mut state = lock(&self.state);
    if state.cancelled {
      return false;
    }
    if n == UNBOUNDED {
      state.unbounded = true;
    } else {
      state.requested = state.requested.saturating_add(n);
      if state.requested == UNBOUNDED {
        state.unbounded = true;
      }
    }
    self.cond.notify_all();
    true
  }

  /// Marks the subscription cancelled and wakes every waiter. Returns `true`
  /// only for the call that performed the transition.
  pub fn cancel(&self) -> bool {
    let mut state = lock(&self.state);
    let first = !state.cancelled;
    state.cancelled = true;
    self.cond.notify_all();
    first
  }

  pub fn is_cancelled(&self) -> bool { lock(&self.state).cancelled }

  pub fn is_unbounded(&self) -> bool { lock(&self.state).unbounded }

  /// Outstanding units, [`UNBOUNDED`] once unbounded.
  pub fn requested(&self) -> u64 {
    let state = lock(&self.state);
    if state.unbounded { UNBOUNDED } else { state.requested }
  }

  /// Blocks until one unit can be consumed. Returns `false` on cancellation.
  pub fn acquire(&self) -> bool {
    let mut state = lock(&self.state);
    loop {
      if state.cancelled {
        return false;
      }
      if state.unbounded {
        return true;
      }
      if state.requested > 0 {
        state.requested -= 1;
        return true;
      }
      state = self.cond.wait(state).unwrap_or_else(std::sync::PoisonError::into_inner);
    }
  }

  /// Consumes one unit if available, without blocking.
  pub fn try_acquire(&self) -> bool {
    let mut state = lock(&self.state);
    if state.cancelled {
      return false;
    }
    if state.unbounded {
      return true;
    }
    if state.requested > 0 {
      state.requested -= 1;
      return true;
    }
    false
  }

  /// Gives back a unit consumed by an item the subscriber rejected.
  pub fn refund(&self) {
    let mut state = lock(&self.state);
    if !state.unbounded {
      state.requested = state.requested.saturating_add(1);
    }
  }
}
