//! Read-only view of the incoming request handed to handlers and middleware.

use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

/// Represents the context of an HTTP request, providing access to the request
/// line and headers.
///
/// Request bodies are owned by the host framework and never flow through this
/// crate, so the context borrows only the request head. The lifetime ties the
/// context to the request data it references.
pub struct RequestContext<'req> {
    head: &'req Parts,
}

impl<'req> RequestContext<'req> {
    /// Creates a new context over a request head.
    pub fn new(head: &'req Parts) -> Self {
        Self { head }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.head.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    #[test]
    fn exposes_request_head() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/blank")
            .header(http::header::ACCEPT_ENCODING, "gzip")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();

        let ctx = RequestContext::new(&parts);
        assert_eq!(ctx.method(), Method::GET);
        assert_eq!(ctx.uri().path(), "/blank");
        assert_eq!(ctx.headers().get(http::header::ACCEPT_ENCODING).unwrap(), "gzip");
    }
}
