use std::sync::{Arc, Mutex, Weak};

use super::stage::{impl_processor, Stage};
use crate::{
  error::Error,
  publisher::{BoxedPublisher, Producer},
  subscriber::Subscriber,
  subscription::{ArcSubscription, Subscription, UNBOUNDED},
  util::lock,
};

pub(crate) type ErrorPredicate = Arc<dyn Fn(&Error) -> bool + Send + Sync>;
pub(crate) type Fallback<T> = Arc<dyn Fn(Error) -> BoxedPublisher<T> + Send + Sync>;

impl<T: Send + 'static> Producer<T> {
  /// Switches to the publisher `fallback` builds when an error satisfies
  /// `predicate`. Only the first error is tested; errors of the fallback are
  /// delivered as they are.
  pub(crate) fn on_error_resume(
    &self,
    predicate: ErrorPredicate,
    fallback: Fallback<T>,
  ) -> Producer<T> {
    self.lift(move || {
      Arc::new_cyclic(|me| OnErrorResumeProcessor {
        stage: Stage::default(),
        predicate: predicate.clone(),
        fallback: fallback.clone(),
        demand: Mutex::new(ResumeDemand::default()),
        me: me.clone(),
      })
    })
  }
}

#[derive(Default)]
struct ResumeDemand {
  outstanding: u64,
  resumed: bool,
}

pub(crate) struct OnErrorResumeProcessor<T> {
  stage: Stage<T>,
  predicate: ErrorPredicate,
  fallback: Fallback<T>,
  demand: Mutex<ResumeDemand>,
  me: Weak<OnErrorResumeProcessor<T>>,
}

impl<T: Send + 'static> Subscriber<T> for OnErrorResumeProcessor<T> {
  /// The fallback subscription inherits the demand the failed upstream left
  /// unserved.
  fn on_subscribe(&self, subscription: ArcSubscription) {
    let inherited = {
      let demand = lock(&self.demand);
      if !self.stage.set_upstream(subscription.clone()) {
        return;
      }
      if demand.resumed { demand.outstanding } else { 0 }
    };
    if inherited > 0 {
      subscription.request(inherited);
    }
  }

  fn on_next(&self, item: T) {
    {
      let mut demand = lock(&self.demand);
      if demand.outstanding != UNBOUNDED {
        demand.outstanding = demand.outstanding.saturating_sub(1);
      }
    }
    self.stage.next(item)
  }

  fn on_complete(&self) { self.stage.complete() }

  fn on_error(&self, err: Error) {
    let resume = {
      let mut demand = lock(&self.demand);
      let resume = !demand.resumed && (self.predicate)(&err);
      demand.resumed = true;
      resume
    };
    if !resume || self.stage.is_done() {
      self.stage.error(err);
      return;
    }
    log::debug!("resuming after error: {err}");
    self.stage.cancel_upstream();
    if let Some(me) = self.me.upgrade() {
      (self.fallback)(err).subscribe_on(me, None);
    }
  }
}

impl<T: Send + 'static> Subscription for OnErrorResumeProcessor<T> {
  fn request(&self, n: u64) {
    let upstream = {
      let mut demand = lock(&self.demand);
      demand.outstanding =
        if n == UNBOUNDED { UNBOUNDED } else { demand.outstanding.saturating_add(n) };
      self.stage.upstream()
    };
    if let Some(upstream) = upstream {
      upstream.request(n);
    }
  }

  fn cancel(&self) { self.stage.cancel() }
}

impl_processor!([T: Send + 'static] OnErrorResumeProcessor<T>, T => T);

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_subscriber::{Event, TestSubscriber},
  };

  fn failing() -> Flux<i32> {
    Flux::from_iter([1, 2]).concat_with(vec![Flux::error(Error::msg("down")).into_boxed()])
  }

  #[test]
  fn resumes_with_fallback() {
    let subscriber = TestSubscriber::unbounded();
    failing().on_error_resume(|_| Flux::from_iter([8, 9])).subscribe(subscriber.clone());
    assert_eq!(subscriber.await_terminal().last(), Some(&Event::Complete));
    assert_eq!(subscriber.items(), vec![1, 2, 8, 9]);
  }

  #[test]
  fn pending_demand_moves_to_fallback() {
    let subscriber = TestSubscriber::new(3);
    failing().on_error_resume(|_| Flux::from_iter(10..20)).subscribe(subscriber.clone());
    assert_eq!(subscriber.await_items(3), vec![1, 2, 10]);
    assert_eq!(subscriber.settle().len(), 3);
    subscriber.request(1);
    assert_eq!(subscriber.await_items(4), vec![1, 2, 10, 11]);
  }

  #[test]
  fn predicate_rejects() {
    let result = failing()
      .on_error_resume_when(|e| e.is_timeout(), |_| Flux::just(0))
      .block_last();
    assert_eq!(result, Err(Error::msg("down")));
  }

  #[test]
  fn fallback_error_is_final() {
    let result = failing()
      .on_error_resume(|e| Flux::<i32>::error(Error::msg(format!("again after {e}"))))
      .block_last();
    assert_eq!(result, Err(Error::msg("again after down")));
  }
}
