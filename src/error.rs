use std::error;
use std::io;
use thiserror::Error;

/// Errors surfaced by the response-writing chain.
///
/// Every variant is a synchronous return value to the immediate caller,
/// nothing is retried or swallowed inside the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("handler error: {source}")]
    Handler { source: Box<dyn error::Error + Send + Sync> },

    #[error("connection has already been hijacked")]
    AlreadyHijacked,

    #[error("the underlying connection does not support hijacking")]
    HijackUnsupported,

    #[error("cannot hijack a connection after the compressed body has been started")]
    HijackAfterWrite,
}

impl Error {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn handler<E: Into<Box<dyn error::Error + Send + Sync>>>(e: E) -> Self {
        Self::Handler { source: e.into() }
    }
}
