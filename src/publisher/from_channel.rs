use std::{
  sync::{
    mpsc::{Receiver, RecvTimeoutError},
    Arc, Mutex,
  },
  time::Duration,
};

use super::{spawn_source, trivial};
use crate::{
  error::Error,
  scheduler::ArcScheduler,
  subscriber::{ArcSubscriber, Emitter},
  subscription::ArcSubscription,
  util::take_once,
};

/// How long a receive blocks before re-checking for cancellation.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) type SharedReceiver<T> = Arc<Mutex<Option<Receiver<T>>>>;

/// Emits what arrives on the channel until every sender is gone. The receiver
/// moves into the first subscription; later subscriptions fail with
/// [`Error::AlreadySubscribed`].
pub(crate) fn produce<T: Send + 'static>(
  receiver: &SharedReceiver<T>,
  subscriber: ArcSubscriber<T>,
  scheduler: Option<ArcScheduler>,
) -> ArcSubscription {
  let Some(rx) = take_once(receiver) else {
    log::warn!("channel source subscribed more than once");
    return trivial::error(Error::AlreadySubscribed, subscriber, scheduler);
  };
  let emitter = Emitter::new(&subscriber);
  let c_subscriber = subscriber.clone();
  spawn_source(&subscriber, scheduler, move |demand| loop {
    if !demand.acquire() {
      return;
    }
    let item = loop {
      match rx.recv_timeout(CANCEL_CHECK_INTERVAL) {
        Ok(item) => break Some(item),
        Err(RecvTimeoutError::Timeout) if !demand.is_cancelled() => continue,
        Err(RecvTimeoutError::Timeout) => return,
        Err(RecvTimeoutError::Disconnected) => break None,
      }
    };
    match item {
      Some(item) => {
        if !emitter.emit(item) {
          demand.refund();
        }
      }
      None => {
        if !demand.is_cancelled() {
          c_subscriber.on_complete();
        }
        return;
      }
    }
  })
}
