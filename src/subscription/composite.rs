use smallvec::SmallVec;

use super::{ArcSubscription, Subscription};

/// Forwards demand to one subscription and cancellation to all of them.
///
/// This is what a downstream subscriber receives from an operator stage: the
/// stage's own subscription first, then the upstream subscription.
pub struct CompositeSubscription {
  primary: ArcSubscription,
  teardown: SmallVec<[ArcSubscription; 2]>,
}

impl CompositeSubscription {
  pub fn new(primary: ArcSubscription) -> Self { Self { primary, teardown: SmallVec::new() } }

  pub fn with(mut self, other: ArcSubscription) -> Self {
    self.teardown.push(other);
    self
  }
}

impl Subscription for CompositeSubscription {
  fn request(&self, n: u64) { self.primary.request(n) }

  fn cancel(&self) {
    self.primary.cancel();
    self.teardown.iter().for_each(|s| s.cancel());
  }
}
