//! The response-writing capability set handed to handlers.
//!
//! [`ResponseWriter`] is a drop-in surface for writing one HTTP response:
//! a buffered header map, a status code, body writes, flushing, before-send
//! hooks and an optional hijack capability. [`TransportWriter`] is the base
//! implementation over a host [`Transport`](crate::transport::Transport);
//! middleware may layer further writers on top of any `ResponseWriter`.

mod transport_writer;

pub use transport_writer::TransportWriter;

use std::io;

use http::{HeaderMap, StatusCode};

use crate::error::Error;
use crate::transport::Hijack;

/// A callback fired exactly once, immediately before response headers are
/// transmitted. The last moment a response can still be mutated.
pub type BeforeHook = Box<dyn FnOnce(&mut dyn ResponseWriter) + Send>;

/// The write/header/flush capability set of an in-flight HTTP response.
///
/// One instance serves exactly one request and is used from that request's
/// call chain only, so implementations carry no internal locking.
pub trait ResponseWriter: Send {
    /// The buffered response headers.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the buffered response headers.
    ///
    /// Mutations are visible in the response until the headers have been
    /// transmitted.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// The response status, `200 OK` unless [`write_header`] recorded
    /// another one.
    ///
    /// [`write_header`]: ResponseWriter::write_header
    fn status(&self) -> StatusCode;

    /// Whether the status and headers have been committed.
    fn header_written(&self) -> bool;

    /// Number of body bytes passed to the underlying transport so far.
    fn bytes_written(&self) -> usize;

    /// Commits the status code and flushes the buffered headers.
    ///
    /// Only the first call has an effect, later calls are ignored.
    fn write_header(&mut self, status: StatusCode) -> Result<(), Error>;

    /// Writes body bytes, implicitly committing headers with `200 OK` first
    /// when [`write_header`](ResponseWriter::write_header) was never called.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error>;

    /// Flushes buffered output towards the client, committing headers first
    /// if necessary.
    fn flush(&mut self) -> Result<(), Error>;

    /// Registers a hook to run just before headers are transmitted.
    ///
    /// Hooks registered after that point never fire.
    fn before(&mut self, hook: BeforeHook);

    /// Capability query for connection hijacking.
    ///
    /// Answers `Some` only when the underlying transport can hand over the
    /// raw client connection.
    fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
        None
    }

    /// Writes an entire buffer, like [`io::Write::write_all`].
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(Error::io(io::Error::new(io::ErrorKind::WriteZero, "transport accepted no bytes")));
            }
            buf = &buf[n..];
        }
        Ok(())
    }
}
