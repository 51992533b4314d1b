use std::sync::Arc;

mod composite;
mod demand;
mod proxy;
mod source;

pub use composite::CompositeSubscription;
pub use demand::Demand;
pub use proxy::ProxySubscription;
pub use source::SourceSubscription;

/// Demand value meaning "no limit". Once requested it is sticky.
pub const UNBOUNDED: u64 = u64::MAX;

/// The handle a subscriber uses to signal demand to, or detach from, its
/// publisher.
///
/// `request` and `cancel` may be called concurrently and repeatedly. Cancelling
/// twice, or after termination, is a no-op.
pub trait Subscription: Send + Sync {
  /// Adds `n` to the outstanding demand, saturating at [`UNBOUNDED`].
  fn request(&self, n: u64);

  fn cancel(&self);

  fn request_unbounded(&self) { self.request(UNBOUNDED) }
}

pub type ArcSubscription = Arc<dyn Subscription>;

/// A subscription that ignores every call, handed out by `never`-like sources.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSubscription;

impl Subscription for NoopSubscription {
  fn request(&self, _: u64) {}

  fn cancel(&self) {}
}
