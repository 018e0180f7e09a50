use std::io;

use bytes::BytesMut;
use http::{HeaderMap, StatusCode};

use crate::transport::Transport;

/// An in-memory [`Transport`] that records everything a response writer sends
/// through it.
///
/// Intended for handler and middleware tests: drive a request through an
/// `App` with a recorder, then assert on the recorded status, headers and
/// body.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    headers_sent: bool,
    flushed: bool,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded status, `200 OK` until headers are sent.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The header set as it was transmitted.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body bytes exactly as they hit the wire.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether `send_headers` has been called.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Whether the transport was flushed at least once.
    pub fn flushed(&self) -> bool {
        self.flushed
    }
}

impl Transport for ResponseRecorder {
    fn send_headers(&mut self, status: StatusCode, headers: &HeaderMap) -> io::Result<()> {
        self.status = status;
        self.headers = headers.clone();
        self.headers_sent = true;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed = true;
        Ok(())
    }
}
