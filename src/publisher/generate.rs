use std::sync::Arc;

use super::spawn_source;
use crate::{
  scheduler::ArcScheduler,
  sink::{Emission, SynchronousSink},
  subscriber::{ArcSubscriber, Emitter},
  subscription::ArcSubscription,
};

pub(crate) type GenerateFn<S, T> = dyn Fn(&mut S, &mut SynchronousSink<T>) + Send + Sync;

/// Calls the generator once per unit of demand, each time with a fresh
/// single-shot sink. The state is built per subscription.
pub(crate) fn produce<S, T>(
  init: Arc<dyn Fn() -> S + Send + Sync>,
  generator: Arc<GenerateFn<S, T>>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription
where
  S: 'static,
  T: Send + 'static,
{
  let emitter = Emitter::new(&subscriber);
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| {
    let mut state = init();
    loop {
      if !demand.acquire() {
        return;
      }
      let mut sink = SynchronousSink::new();
      generator(&mut state, &mut sink);
      match sink.finish() {
        Emission::Next(item) => {
          if !emitter.emit(item) {
            demand.refund();
          }
        }
        Emission::Complete => {
          if !demand.is_cancelled() {
            c_subscriber.on_complete();
          }
          return;
        }
        Emission::Error(err) => {
          if !demand.is_cancelled() {
            c_subscriber.on_error(err);
          }
          return;
        }
      }
    }
  })
}
