use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{Demand, Subscription};
use crate::scheduler::ArcCancellable;

/// The subscription a scheduled source hands to its subscriber: demand goes to
/// the shared [`Demand`], cancellation to both the demand and the scheduled
/// action.
pub struct SourceSubscription {
  demand: Arc<Demand>,
  task: OnceCell<ArcCancellable>,
}

impl SourceSubscription {
  pub fn new(demand: Arc<Demand>) -> Self { Self { demand, task: OnceCell::new() } }

  pub fn demand(&self) -> &Arc<Demand> { &self.demand }

  /// Links the scheduled action. Cancels it right away if the subscriber
  /// already cancelled.
  pub fn attach(&self, task: ArcCancellable) {
    let _ = self.task.set(task);
    if self.demand.is_cancelled() {
      if let Some(task) = self.task.get() {
        task.cancel();
      }
    }
  }
}

impl Subscription for SourceSubscription {
  fn request(&self, n: u64) { self.demand.request(n); }

  fn cancel(&self) {
    self.demand.cancel();
    if let Some(task) = self.task.get() {
      task.cancel();
    }
  }
}
