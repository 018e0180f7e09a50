//! Explicit function composition for the request-handling chain.
//!
//! A [`Middleware`] transforms one [`Handler`] into another, wrapping or
//! replacing the response-writing surface before delegating. Registration
//! order is preserved by [`MiddlewareStack`]: the middleware registered
//! first sits outermost and therefore runs first.

use crate::handler::Handler;

/// A handler-transforming function: the framework's "use this for every
/// request" building block.
pub trait Middleware<H: Handler> {
    /// The transformed handler.
    type Out: Handler;

    /// Wraps `next`, producing the handler that will actually serve requests.
    fn apply(&self, next: H) -> Self::Out;
}

/// A middleware that changes nothing, the empty chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMiddleware;

impl<H: Handler> Middleware<H> for IdentityMiddleware {
    type Out = H;

    #[inline]
    fn apply(&self, next: H) -> Self::Out {
        next
    }
}

/// Two middlewares composed in registration order: `earlier` was registered
/// before `later`, so `earlier` ends up wrapping `later`'s output.
pub struct MiddlewareStack<Earlier, Later> {
    earlier: Earlier,
    later: Later,
}

impl<Earlier, Later> MiddlewareStack<Earlier, Later> {
    pub fn new(earlier: Earlier, later: Later) -> Self {
        Self { earlier, later }
    }
}

impl<H, Earlier, Later> Middleware<H> for MiddlewareStack<Earlier, Later>
where
    H: Handler,
    Later: Middleware<H>,
    Earlier: Middleware<Later::Out>,
{
    type Out = Earlier::Out;

    fn apply(&self, next: H) -> Self::Out {
        self.earlier.apply(self.later.apply(next))
    }
}
