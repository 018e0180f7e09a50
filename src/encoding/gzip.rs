use std::io::Write as _;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use tracing::{error, trace, warn};

use crate::encoding::{accepts_gzip, Writer};
use crate::error::Error;
use crate::handler::Handler;
use crate::middleware::Middleware;
use crate::request::RequestContext;
use crate::transport::{Connection, Hijack};
use crate::writer::{BeforeHook, ResponseWriter};

/// Middleware that gzip-compresses response bodies for clients advertising
/// `gzip` in `Accept-Encoding`.
///
/// Requests without the coding bypass the decorator entirely; for the rest
/// the decision to actually compress is deferred until the first body byte,
/// so empty responses and responses carrying their own `Content-Encoding`
/// go out untouched.
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    /// A middleware compressing at the given level.
    pub fn new(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl<H: Handler> Middleware<H> for Gzip {
    type Out = GzipHandler<H>;

    fn apply(&self, next: H) -> Self::Out {
        GzipHandler { handler: next, level: self.level }
    }
}

/// The handler produced by [`Gzip`]: wraps the response writer in a
/// compressing decorator for the duration of the inner handler.
pub struct GzipHandler<H> {
    handler: H,
    level: Compression,
}

#[async_trait]
impl<H: Handler> Handler for GzipHandler<H> {
    async fn handle(&self, req: &RequestContext<'_>, rw: &mut dyn ResponseWriter) -> Result<(), Error> {
        if !accepts_gzip(req.headers()) {
            return self.handler.handle(req, rw).await;
        }

        let mut encoded = GzipResponseWriter::new(rw, self.level);
        let served = self.handler.handle(req, &mut encoded).await;
        // finalize on every exit path so the gzip footer reaches the client,
        // Drop covers unwinds
        let finished = encoded.finish();
        served?;
        finished
    }
}

/// Response-writer decorator that substitutes a gzip stream for the raw
/// output on the first body byte.
///
/// Until then nothing is committed downstream: the wrapped writer's header
/// map doubles as the buffered header set, and the recorded status is
/// replayed when the stream (or the empty response) is finalized. Once the
/// decision is made it never changes; a hijack makes the decorator a
/// permanent pass-through.
pub(crate) struct GzipResponseWriter<'a> {
    inner: &'a mut (dyn ResponseWriter + 'a),
    level: Compression,
    status: StatusCode,
    header_written: bool,
    decided: bool,
    passthrough: bool,
    committed: bool,
    hijacked: bool,
    closed: bool,
    encoder: Option<GzEncoder<Writer>>,
}

impl<'a> GzipResponseWriter<'a> {
    pub(crate) fn new(inner: &'a mut (dyn ResponseWriter + 'a), level: Compression) -> Self {
        Self {
            inner,
            level,
            status: StatusCode::OK,
            header_written: false,
            decided: false,
            passthrough: false,
            committed: false,
            hijacked: false,
            closed: false,
            encoder: None,
        }
    }

    /// Finalizes the response. Flushes the gzip footer when a stream was
    /// opened; replays a recorded status that never got committed. Safe to
    /// call more than once.
    pub(crate) fn finish(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.hijacked {
            return Ok(());
        }
        if let Some(encoder) = self.encoder.take() {
            let trailing = encoder.finish()?.into_bytes();
            if !trailing.is_empty() {
                self.inner.write_all(&trailing)?;
            }
        } else if self.header_written && !self.committed {
            // empty body: the status still goes out, the gzip header never does
            self.committed = true;
            self.inner.write_header(self.status)?;
        }
        Ok(())
    }

    /// Settles compress vs pass-through. Runs exactly once per response.
    fn decide(&mut self) {
        self.decided = true;
        if self.inner.headers().contains_key(header::CONTENT_ENCODING) {
            // the handler produced its own encoding
            self.passthrough = true;
        }
    }

    /// Commits the compressed response: gzip headers in, stale length out,
    /// recorded status downstream, encoder opened.
    fn commit(&mut self) -> Result<(), Error> {
        let headers = self.inner.headers_mut();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.append(header::VARY, HeaderValue::from_static("Accept-Encoding"));
        // a stale length would describe the uncompressed body
        headers.remove(header::CONTENT_LENGTH);

        trace!(status = %self.status, "starting gzip response stream");
        self.committed = true;
        self.inner.write_header(self.status)?;
        self.encoder = Some(GzEncoder::new(Writer::new(), self.level));
        Ok(())
    }

    fn drain_encoder(&mut self) -> Result<(), Error> {
        // safe: callers only drain with an open encoder
        let ready = self.encoder.as_mut().unwrap().get_mut().take();
        if !ready.is_empty() {
            self.inner.write_all(&ready)?;
        }
        Ok(())
    }
}

impl ResponseWriter for GzipResponseWriter<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn status(&self) -> StatusCode {
        if self.header_written { self.status } else { self.inner.status() }
    }

    fn header_written(&self) -> bool {
        self.header_written || self.inner.header_written()
    }

    fn bytes_written(&self) -> usize {
        self.inner.bytes_written()
    }

    fn write_header(&mut self, status: StatusCode) -> Result<(), Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if self.header_written {
            // delegating would commit the headers before the stream decision
            warn!(status = %status, "superfluous write_header call ignored");
            return Ok(());
        }
        self.status = status;
        self.header_written = true;
        if !self.decided {
            self.decide();
        }
        if self.passthrough {
            self.committed = true;
            return self.inner.write_header(status);
        }
        // compression selected: the gzip header set and the stream are only
        // committed once a first body byte arrives, so an empty response
        // never advertises gzip
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.decided {
            self.decide();
        }
        if self.passthrough {
            return self.inner.write(buf);
        }
        if self.encoder.is_none() {
            self.commit()?;
        }
        // safe: commit() always installs the encoder
        self.encoder.as_mut().unwrap().write_all(buf).map_err(|e| {
            trace!("gzip encoding failed: {e}");
            Error::io(e)
        })?;
        self.drain_encoder()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if !self.decided {
            self.decide();
        }
        if self.encoder.is_some() {
            // safe: checked just above
            self.encoder.as_mut().unwrap().flush()?;
            self.drain_encoder()?;
        } else if !self.passthrough {
            // flushing before the first body byte sends the headers
            // uncompressed, which settles the decision as no-compress
            self.passthrough = true;
            self.committed = true;
            if self.header_written {
                self.inner.write_header(self.status)?;
            }
        }
        self.inner.flush()
    }

    fn before(&mut self, hook: BeforeHook) {
        self.inner.before(hook);
    }

    fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
        self.inner.hijacker()?;
        Some(self)
    }
}

impl Hijack for GzipResponseWriter<'_> {
    fn hijack(&mut self) -> Result<Box<dyn Connection>, Error> {
        if self.encoder.is_some() {
            // the gzip stream is half-written, handing over the raw
            // connection now would corrupt it
            return Err(Error::HijackAfterWrite);
        }
        let conn = match self.inner.hijacker() {
            Some(hijack) => hijack.hijack()?,
            None => return Err(Error::HijackUnsupported),
        };
        self.hijacked = true;
        Ok(conn)
    }
}

impl Drop for GzipResponseWriter<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.finish() {
                error!("failed to finalize gzip stream: {err}");
            }
        }
    }
}
