//! Write-only emission surfaces handed to user code by `create`, `generate`
//! and `handle`.

pub(crate) mod flux_sink;
mod mono_sink;
mod synchronous_sink;

pub use flux_sink::FluxSink;
pub(crate) use flux_sink::SinkSubscription;
pub use mono_sink::MonoSink;
pub use synchronous_sink::{Emission, SynchronousSink};

/// What a push-style producer's excess items turn into when they outrun
/// downstream demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverflowStrategy {
  /// Queue everything, terminal signals included, and replay in order as
  /// demand arrives.
  #[default]
  Buffer,
  /// Discard excess items. Terminal signals are still delivered.
  Drop,
  /// Fail with [`Error::DownstreamUnableToKeepUp`](crate::error::Error) on the
  /// first excess item.
  Error,
  /// Deliver regardless of demand.
  Ignore,
}
