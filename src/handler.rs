use async_trait::async_trait;

use crate::error::Error;
use crate::request::RequestContext;
use crate::writer::ResponseWriter;

/// An async request handler.
///
/// Handlers receive the request head and the response-writing capability set
/// and produce the response by writing into it. Existing handler code keeps
/// working unchanged when middleware swaps the writer underneath it.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: &RequestContext<'_>, rw: &mut dyn ResponseWriter) -> Result<(), Error>;
}

/// A [`Handler`] built from a plain synchronous closure.
///
/// Most leaf handlers just write a few bytes; for those the closure form
/// avoids an `impl Handler` block. Handlers that need to await something
/// implement [`Handler`] directly.
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut dyn ResponseWriter) -> Result<(), Error> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut dyn ResponseWriter) -> Result<(), Error> + Send + Sync,
{
    async fn handle(&self, req: &RequestContext<'_>, rw: &mut dyn ResponseWriter) -> Result<(), Error> {
        (self.f)(req, rw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ResponseRecorder;
    use crate::writer::TransportWriter;
    use http::Request;

    fn assert_is_handler<T: Handler>(_handler: &T) {
        // no op
    }

    #[test]
    fn closures_are_handlers() {
        let handler = handler_fn(|_req, rw| rw.write_all(b"data!"));
        assert_is_handler(&handler);
    }

    #[tokio::test]
    async fn closure_handler_writes_body() {
        let handler = handler_fn(|_req, rw| rw.write_all(b"data!"));

        let (parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let ctx = RequestContext::new(&parts);

        let mut recorder = ResponseRecorder::new();
        let mut writer = TransportWriter::new(&mut recorder);
        handler.handle(&ctx, &mut writer).await.unwrap();
        writer.close().unwrap();

        assert_eq!(recorder.body(), b"data!");
    }
}
