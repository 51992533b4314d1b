//! The `log` operator, captured through a `log::Log` implementation.

mod support;

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use reflux::prelude::*;
use support::{eventually, StepVerifier};

struct Capture {
  lines: Mutex<Vec<(String, String)>>,
}

impl Log for Capture {
  fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= Level::Info }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      let line = (record.target().to_owned(), record.args().to_string());
      self.lines.lock().unwrap().push(line);
    }
  }

  fn flush(&self) {}
}

static CAPTURE: Capture = Capture { lines: Mutex::new(Vec::new()) };

fn install() {
  let _ = log::set_logger(&CAPTURE);
  log::set_max_level(LevelFilter::Info);
}

fn lines_for(target: &str) -> Vec<String> {
  CAPTURE
    .lines
    .lock()
    .unwrap()
    .iter()
    .filter(|(t, _)| t == target)
    .map(|(_, line)| line.clone())
    .collect()
}

#[test]
fn logs_every_event() {
  install();
  let flux = Flux::from_iter(vec![1, 2]).log("flow.items");
  StepVerifier::with_request(flux, 2)
    .expect_next(1)
    .expect_next(2)
    .expect_complete()
    .verify();
  assert_eq!(
    lines_for("flow.items"),
    vec!["Subscribed", "Request: 2", "Next: 1", "Next: 2", "Complete"]
  );
}

#[test]
fn logs_errors_and_cancels() {
  install();
  let failing = Flux::<i32>::error(Error::msg("boom")).log("flow.error");
  StepVerifier::create(failing).expect_error(Error::msg("boom")).verify();
  eventually(|| lines_for("flow.error").last().map(String::as_str) == Some("Error: boom"));

  let endless = Flux::from_iter(0..).log("flow.cancel");
  StepVerifier::with_request(endless, 1).expect_next(0).then_cancel().verify();
  eventually(|| lines_for("flow.cancel").last().map(String::as_str) == Some("Cancel"));
}
