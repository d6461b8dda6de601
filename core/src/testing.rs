//! In-memory `Transport` for unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use crate::error::ExecError;
use crate::executor::{RawResponse, Transport};
use crate::http::RequestSpec;

/// Replays queued responses in order and records every request it was sent.
/// Sending with an empty queue panics, which flags an unexpected network call.
#[derive(Default)]
pub struct RecordingTransport {
    responses: RefCell<VecDeque<Result<RawResponse, ExecError>>>,
    calls: RefCell<Vec<(RequestSpec, bool)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, response: RawResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn push_err(&self, err: ExecError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.push_ok(RawResponse {
            status,
            headers: BTreeMap::from([("Content-Type".to_string(), "text/plain".to_string())]),
            body: Some(body.as_bytes().to_vec()),
        });
    }

    pub fn calls(&self) -> Vec<RequestSpec> {
        self.calls.borrow().iter().map(|(spec, _)| spec.clone()).collect()
    }

    pub fn read_body_flags(&self) -> Vec<bool> {
        self.calls.borrow().iter().map(|(_, read)| *read).collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, spec: &RequestSpec, read_body: bool) -> Result<RawResponse, ExecError> {
        self.calls.borrow_mut().push((spec.clone(), read_body));
        let mut response = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {}", spec.url))?;
        if !read_body {
            response.body = None;
        }
        Ok(response)
    }
}
