//! The seam between this crate and the host server.
//!
//! A [`Transport`] is whatever the host exposes for one outgoing response: a
//! place to send the status line plus headers, a byte sink for the body, and
//! optionally the ability to hand over the raw client connection for protocol
//! upgrades. Writers in this crate are built on top of this trait, the host's
//! connection code implements it.

mod recorder;

pub use recorder::ResponseRecorder;

use std::io;

use http::{HeaderMap, StatusCode};

use crate::error::Error;

/// Raw byte-level access to a client connection, obtained through a hijack.
///
/// Once handed out, the HTTP response abstraction no longer applies and the
/// holder speaks whatever protocol it upgraded to.
pub trait Connection: io::Read + io::Write + Send {}

impl<T: io::Read + io::Write + Send> Connection for T {}

/// The hijack capability: taking exclusive control of the underlying
/// connection, bypassing response writing entirely.
pub trait Hijack {
    /// Takes the raw connection. Succeeds at most once.
    fn hijack(&mut self) -> Result<Box<dyn Connection>, Error>;
}

/// Per-response surface the host server provides.
///
/// Errors bubble out as plain `io::Error` here, the writer layer above wraps
/// them. The hijack capability is opt-in: transports that are not backed by a
/// real client connection keep the default `None`.
pub trait Transport: Send {
    /// Transmits the status line and the finalized header set.
    fn send_headers(&mut self, status: StatusCode, headers: &HeaderMap) -> io::Result<()>;

    /// Writes body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flushes buffered bytes towards the client.
    fn flush(&mut self) -> io::Result<()>;

    /// Capability query: transports backed by a raw client connection answer
    /// with their hijack handle.
    fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_headers(&mut self, status: StatusCode, headers: &HeaderMap) -> io::Result<()> {
        (**self).send_headers(status, headers)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
        (**self).hijacker()
    }
}
