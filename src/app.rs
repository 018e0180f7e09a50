//! Chain registration and the per-request entry point.

use http::Request;

use crate::error::Error;
use crate::handler::Handler;
use crate::middleware::{IdentityMiddleware, Middleware, MiddlewareStack};
use crate::request::RequestContext;
use crate::transport::Transport;
use crate::writer::TransportWriter;

/// Builds the request-handling chain.
///
/// Middleware registered with [`using`](AppBuilder::using) applies to every
/// request, in registration order: the first registration runs outermost.
/// [`action`](AppBuilder::action) seals the chain with the final handler.
#[derive(Debug, Default)]
pub struct AppBuilder<S> {
    stack: S,
}

impl AppBuilder<IdentityMiddleware> {
    pub fn new() -> Self {
        Self { stack: IdentityMiddleware }
    }
}

impl<S> AppBuilder<S> {
    /// Registers a middleware for every request.
    pub fn using<M>(self, middleware: M) -> AppBuilder<MiddlewareStack<S, M>> {
        AppBuilder { stack: MiddlewareStack::new(self.stack, middleware) }
    }

    /// Seals the chain with the final handler, producing the [`App`].
    pub fn action<H>(self, handler: H) -> App<S::Out>
    where
        H: Handler,
        S: Middleware<H>,
    {
        App { handler: self.stack.apply(handler) }
    }
}

/// The sealed chain: one composed [`Handler`] serving every request.
pub struct App<H> {
    handler: H,
}

impl<H: Handler> App<H> {
    /// Serves one request.
    ///
    /// Builds the per-request response writer over `transport`, invokes the
    /// chain, and closes the writer on every exit path so headers are
    /// committed (and before-send hooks fired) even when the handler wrote
    /// nothing or bailed out early.
    pub async fn handle<T, B>(&self, request: Request<B>, transport: T) -> Result<(), Error>
    where
        T: Transport,
    {
        let (parts, _body) = request.into_parts();
        let ctx = RequestContext::new(&parts);

        let mut writer = TransportWriter::new(transport);
        let served = self.handler.handle(&ctx, &mut writer).await;
        let closed = writer.close();
        served?;
        closed
    }
}
