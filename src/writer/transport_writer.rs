use std::mem;

use http::{HeaderMap, StatusCode};
use tracing::warn;

use crate::error::Error;
use crate::transport::{Connection, Hijack, Transport};
use crate::writer::{BeforeHook, ResponseWriter};

/// The base [`ResponseWriter`] over a host [`Transport`].
///
/// Buffers the header map and status until the first body write, explicit
/// header commit or flush, and runs registered before-send hooks at that
/// point. Created once per request by [`App`](crate::App), which also
/// guarantees [`close`](TransportWriter::close) runs on every exit path.
pub struct TransportWriter<T> {
    transport: T,
    headers: HeaderMap,
    status: StatusCode,
    header_written: bool,
    bytes_written: usize,
    hijacked: bool,
    hooks: Vec<BeforeHook>,
}

impl<T: Transport> TransportWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            headers: HeaderMap::new(),
            status: StatusCode::OK,
            header_written: false,
            bytes_written: 0,
            hijacked: false,
            hooks: Vec::new(),
        }
    }

    /// Finishes the response: commits headers when the handler never did
    /// (this is what makes before-send hooks fire even for empty bodies) and
    /// flushes the transport. A hijacked response is left untouched.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.hijacked {
            return Ok(());
        }
        if !self.header_written {
            self.write_header(self.status)?;
        }
        self.transport.flush()?;
        Ok(())
    }

    /// Consumes the writer and hands back the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: Transport> ResponseWriter for TransportWriter<T> {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn header_written(&self) -> bool {
        self.header_written
    }

    fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn write_header(&mut self, status: StatusCode) -> Result<(), Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if self.header_written {
            warn!(status = %status, "superfluous write_header call ignored");
            return Ok(());
        }
        self.status = status;
        self.header_written = true;
        for hook in mem::take(&mut self.hooks) {
            hook(self);
        }
        self.transport.send_headers(self.status, &self.headers)?;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if !self.header_written {
            self.write_header(StatusCode::OK)?;
        }
        let n = self.transport.write(buf)?;
        self.bytes_written += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        if !self.header_written {
            self.write_header(self.status)?;
        }
        self.transport.flush()?;
        Ok(())
    }

    fn before(&mut self, hook: BeforeHook) {
        // if headers are already on the wire the hook is kept but never fires
        self.hooks.push(hook);
    }

    fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
        self.transport.hijacker()?;
        Some(self)
    }
}

impl<T: Transport> Hijack for TransportWriter<T> {
    fn hijack(&mut self) -> Result<Box<dyn Connection>, Error> {
        if self.hijacked {
            return Err(Error::AlreadyHijacked);
        }
        let conn = match self.transport.hijacker() {
            Some(hijack) => hijack.hijack()?,
            None => return Err(Error::HijackUnsupported),
        };
        self.hijacked = true;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ResponseRecorder;
    use http::header;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn implicit_status_on_first_write() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);

        writer.write_all(b"data!").unwrap();
        writer.close().unwrap();

        assert_eq!(recorder.status(), StatusCode::OK);
        assert!(recorder.headers_sent());
        assert_eq!(recorder.body(), b"data!");
    }

    #[test]
    fn close_commits_headers_for_empty_body() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);
        writer.headers_mut().insert(header::SERVER, "micro".parse().unwrap());

        writer.close().unwrap();

        assert!(recorder.headers_sent());
        assert_eq!(recorder.headers().get(header::SERVER).unwrap(), "micro");
        assert!(recorder.body().is_empty());
        assert!(recorder.flushed());
    }

    #[test]
    fn superfluous_write_header_keeps_first_status() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);

        writer.write_header(StatusCode::NOT_FOUND).unwrap();
        writer.write_header(StatusCode::OK).unwrap();
        writer.close().unwrap();

        assert_eq!(recorder.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn hooks_fire_once_before_headers() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);

        let count = Arc::clone(&fired);
        writer.before(Box::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        writer.write_all(b"body").unwrap();
        writer.close().unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_mutations_reach_the_wire() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);

        writer.before(Box::new(|rw| {
            rw.headers_mut().insert(header::SERVER, "hooked".parse().unwrap());
        }));
        writer.write_all(b"body").unwrap();
        writer.close().unwrap();

        assert_eq!(recorder.headers().get(header::SERVER).unwrap(), "hooked");
    }

    #[test]
    fn hook_registered_after_headers_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);

        writer.write_header(StatusCode::OK).unwrap();
        let count = Arc::clone(&fired);
        writer.before(Box::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
        writer.close().unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    struct HijackTransport {
        hijacked: bool,
    }

    impl Transport for HijackTransport {
        fn send_headers(&mut self, _status: StatusCode, _headers: &HeaderMap) -> io::Result<()> {
            panic!("headers must not be sent on a hijacked connection");
        }

        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            panic!("body bytes must not be sent on a hijacked connection");
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn hijacker(&mut self) -> Option<&mut dyn Hijack> {
            Some(self)
        }
    }

    impl Hijack for HijackTransport {
        fn hijack(&mut self) -> Result<Box<dyn Connection>, Error> {
            self.hijacked = true;
            Ok(Box::new(io::Cursor::new(Vec::new())))
        }
    }

    #[test]
    fn hijack_delegates_and_disables_writing() {
        let mut transport = HijackTransport { hijacked: false };
        let mut writer = TransportWriter::new(&mut transport);

        let _conn = writer.hijacker().expect("transport supports hijack").hijack().unwrap();
        assert!(matches!(writer.write(b"x"), Err(Error::AlreadyHijacked)));
        assert!(matches!(writer.write_header(StatusCode::OK), Err(Error::AlreadyHijacked)));
        writer.close().unwrap();

        assert!(transport.hijacked);
    }

    #[test]
    fn recorder_has_no_hijack_capability() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);
        assert!(writer.hijacker().is_none());
    }
}
