use crate::error::Error;

/// The single outcome of one `generate` or `handle` callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission<T> {
  Next(T),
  Complete,
  Error(Error),
}

/// A single-shot sink: within one callback invocation the first call wins and
/// later calls are ignored.
#[derive(Debug)]
pub struct SynchronousSink<T> {
  emission: Option<Emission<T>>,
}

impl<T> SynchronousSink<T> {
  pub(crate) fn new() -> Self { Self { emission: None } }

  pub fn next(&mut self, item: T) { self.record(Emission::Next(item)) }

  pub fn complete(&mut self) { self.record(Emission::Complete) }

  pub fn error(&mut self, err: Error) { self.record(Emission::Error(err)) }

  pub fn has_emitted(&self) -> bool { self.emission.is_some() }

  /// The recorded outcome; no call at all is a contract violation.
  pub(crate) fn finish(self) -> Emission<T> {
    self.emission.unwrap_or(Emission::Error(Error::NoEmissionOnSynchronousSink))
  }

  fn record(&mut self, emission: Emission<T>) {
    if self.emission.is_none() {
      self.emission = Some(emission);
    }
  }
}
