pub use crate::{
  error::{Error, Result},
  flux::Flux,
  mono::Mono,
  ops::into_stream::IntoStream,
  publisher::{BoxedPublisher, Processor, Publisher, ScalarCallable},
  scheduler::{
    new_thread, ArcScheduler, CancelToken, Cancellable, Canceller, Scheduler, ThreadScheduler,
    ThreadSchedulerConfig,
  },
  signal::{Signal, SignalType},
  sink::{Emission, FluxSink, MonoSink, OverflowStrategy, SynchronousSink},
  subscriber::{ArcSubscriber, ConditionalSubscriber, LambdaSubscriber, Subscriber},
  subscription::{
    ArcSubscription, CompositeSubscription, NoopSubscription, Subscription, UNBOUNDED,
  },
};

#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
