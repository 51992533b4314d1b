use std::sync::Mutex;

use super::{ArcSubscription, Subscription, UNBOUNDED};
use crate::util::lock;

/// A subscription handed out before the real one exists.
///
/// Demand and cancellation arriving early are recorded and replayed once
/// [`ProxySubscription::set`] installs the target. Used where the upstream is
/// only known after work runs on a scheduler (`defer`, `using`).
#[derive(Default)]
pub struct ProxySubscription {
  state: Mutex<ProxyState>,
}

#[derive(Default)]
struct ProxyState {
  target: Option<ArcSubscription>,
  pending: u64,
  cancelled: bool,
}

impl ProxySubscription {
  pub fn new() -> Self { Self::default() }

  /// Installs the target. Only the first call has an effect.
  pub fn set(&self, target: ArcSubscription) {
    let (cancelled, pending) = {
      let mut state = lock(&self.state);
      if state.target.is_some() {
        return;
      }
      state.target = Some(target.clone());
      (state.cancelled, std::mem::take(&mut state.pending))
    };
    if cancelled {
      target.cancel();
    } else if pending > 0 {
      target.request(pending);
    }
  }

  pub fn is_cancelled(&self) -> bool { lock(&self.state).cancelled }
}

impl Subscription for ProxySubscription {
  fn request(&self, n: u64) {
    let target = {
      let mut state = lock(&self.state);
      if state.cancelled {
        return;
      }
      match &state.target {
        Some(target) => target.clone(),
        None => {
          state.pending =
            if n == UNBOUNDED { UNBOUNDED } else { state.pending.saturating_add(n) };
          return;
        }
      }
    };
    target.request(n);
  }

  fn cancel(&self) {
    let target = {
      let mut state = lock(&self.state);
      if state.cancelled {
        return;
      }
      state.cancelled = true;
      state.target.clone()
    };
    if let Some(target) = target {
      target.cancel();
    }
  }
}
