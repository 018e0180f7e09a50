//! Content-coding negotiation and the gzip response stream.

mod gzip;

pub use gzip::{Gzip, GzipHandler};

use std::io;

use bytes::{Bytes, BytesMut};
use http::{header, HeaderMap};

/// In-memory sink the encoder compresses into; drained towards the wrapped
/// writer after every write.
pub(crate) struct Writer {
    buf: BytesMut,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }

    pub(crate) fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Whether the request advertises gzip in `Accept-Encoding`.
///
/// Token-wise match over the comma-separated coding list, ignoring `;q=`
/// parameters and ASCII case. Malformed or missing headers simply mean "no
/// compression requested".
pub(crate) fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|part| {
            let coding = part.split(';').next().unwrap_or(part).trim();
            coding.eq_ignore_ascii_case("gzip")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ACCEPT_ENCODING;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_means_no_compression() {
        assert!(!accepts_gzip(&HeaderMap::new()));
    }

    #[test]
    fn plain_gzip_token() {
        assert!(accepts_gzip(&headers("gzip")));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(accepts_gzip(&headers("GZip")));
    }

    #[test]
    fn token_found_in_coding_list() {
        assert!(accepts_gzip(&headers("deflate, gzip;q=0.8, br")));
    }

    #[test]
    fn other_codings_do_not_match() {
        assert!(!accepts_gzip(&headers("deflate, br")));
        assert!(!accepts_gzip(&headers("identity")));
    }

    #[test]
    fn partial_tokens_do_not_match() {
        assert!(!accepts_gzip(&headers("x-gzip-like")));
    }

    #[test]
    fn any_header_occurrence_counts() {
        let mut map = HeaderMap::new();
        map.append(ACCEPT_ENCODING, HeaderValue::from_static("br"));
        map.append(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        assert!(accepts_gzip(&map));
    }

    #[test]
    fn writer_drains_and_keeps_remainder() {
        use std::io::Write as _;

        let mut writer = Writer::new();
        writer.write_all(b"abc").unwrap();
        assert_eq!(writer.take(), Bytes::from_static(b"abc"));
        assert!(writer.take().is_empty());

        writer.write_all(b"tail").unwrap();
        assert_eq!(writer.into_bytes(), Bytes::from_static(b"tail"));
    }
}
