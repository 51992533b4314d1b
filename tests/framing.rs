//! Length-prefixed frames decoded with `generate_with_state` and `handle`.

mod support;

use std::{
  fmt,
  sync::{Arc, Mutex},
  time::Duration,
};

use reflux::prelude::*;
use support::StepVerifier;

#[derive(Debug)]
struct BadFrame(usize);

impl fmt::Display for BadFrame {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "frame {} is not utf-8", self.0)
  }
}

impl std::error::Error for BadFrame {}

fn encode(frames: &[&[u8]]) -> Vec<u8> {
  let mut out = vec![];
  for frame in frames {
    out.push(frame.len() as u8);
    out.extend_from_slice(frame);
  }
  out
}

/// Splits `bytes` into frames. A truncated trailing frame is an error.
fn frames(bytes: Vec<u8>) -> Flux<(usize, Vec<u8>)> {
  let bytes = Arc::new(bytes);
  Flux::generate_with_state(
    || (0usize, 0usize),
    move |(offset, index), sink| {
      if *offset == bytes.len() {
        return sink.complete();
      }
      let len = bytes[*offset] as usize;
      let start = *offset + 1;
      match bytes.get(start..start + len) {
        Some(body) => {
          sink.next((*index, body.to_vec()));
          *offset = start + len;
          *index += 1;
        }
        None => sink.error(Error::msg("truncated frame")),
      }
    },
  )
}

fn decode(bytes: Vec<u8>) -> Flux<String> {
  frames(bytes).handle(|(index, body), sink| match String::from_utf8(body) {
    Ok(text) => sink.next(text),
    Err(_) => sink.error(Error::custom(BadFrame(index))),
  })
}

#[test]
fn decodes_frames_in_order() {
  let bytes = encode(&[b"hello", b"", b"world"]);
  StepVerifier::create(decode(bytes))
    .expect_next("hello".to_owned())
    .expect_next(String::new())
    .expect_next("world".to_owned())
    .expect_complete()
    .verify();
}

/// The generator only runs, completion included, against demand.
#[test]
fn decodes_on_demand() {
  let bytes = encode(&[b"a", b"b", b"c"]);
  StepVerifier::with_request(decode(bytes), 1)
    .expect_next("a".to_owned())
    .then_request(2)
    .expect_next("b".to_owned())
    .expect_next("c".to_owned())
    .expect_no_event(Duration::from_millis(30))
    .then_request(1)
    .expect_complete()
    .verify();
}

#[test]
fn truncated_input_fails() {
  let mut bytes = encode(&[b"ok"]);
  bytes.extend_from_slice(&[9, 1, 2]);
  StepVerifier::create(decode(bytes))
    .expect_next("ok".to_owned())
    .expect_error(Error::msg("truncated frame"))
    .verify();
}

#[test]
fn invalid_text_names_the_frame() {
  let bytes = encode(&[b"fine", &[0xff, 0xfe]]);
  StepVerifier::create(decode(bytes))
    .expect_next("fine".to_owned())
    .expect_error_matches(|err| err.to_string() == "frame 1 is not utf-8")
    .verify();
}

#[test]
fn recovers_with_a_placeholder() {
  let bytes = encode(&[&[0xc3]]);
  let recovered = decode(bytes).on_error_return("<invalid>".to_owned());
  assert_eq!(recovered.block_last(), Ok(Some("<invalid>".to_owned())));
}

/// Writes the single item of `message` as one frame into `out`.
fn encode_into(message: Mono<String>, out: Arc<Mutex<Vec<u8>>>) -> Mono<usize> {
  message.handle(move |text, sink| {
    let body = text.into_bytes();
    match u8::try_from(body.len()) {
      Ok(len) => {
        let mut out = out.lock().unwrap();
        out.push(len);
        out.extend_from_slice(&body);
        sink.next(body.len() + 1);
      }
      Err(_) => sink.error(Error::msg("frame too long")),
    }
  })
}

#[test]
fn encodes_a_single_message() {
  let out = Arc::new(Mutex::new(vec![]));
  let written = encode_into(Mono::just("hey".to_owned()), out.clone());
  StepVerifier::create(written)
    .then_await(Duration::from_millis(5))
    .expect_next(4)
    .expect_complete()
    .verify();
  assert_eq!(*out.lock().unwrap(), encode(&[b"hey"]));
  let too_long = encode_into(Mono::just("x".repeat(300)), out);
  assert_eq!(too_long.block(), Err(Error::msg("frame too long")));
}
