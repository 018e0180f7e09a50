//! Gzip response compression middleware for a composable handler chain.
//!
//! The crate is built around three pieces:
//!
//! - [`ResponseWriter`]: the write/header/flush capability set handlers see,
//!   with before-send hooks and an optional hijack capability. The base
//!   implementation, [`TransportWriter`], sits on whatever [`Transport`] the
//!   host server provides.
//! - [`Middleware`]: explicit function composition over handlers. Middleware
//!   registered through [`AppBuilder::using`] runs in registration order and
//!   may wrap the response writer before delegating.
//! - [`Gzip`]: the compressing middleware. It decorates the writer and defers
//!   the compression decision to the first body byte, so empty responses,
//!   responses carrying their own `Content-Encoding`, and hijacked
//!   connections all go out untouched.
//!
//! # Example
//!
//! ```
//! use http::Request;
//! use http::header::ACCEPT_ENCODING;
//! use micro_gzip::{handler_fn, AppBuilder, Gzip, ResponseRecorder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = AppBuilder::new()
//!     .using(Gzip::default())
//!     .action(handler_fn(|_req, rw| rw.write_all(b"data!")));
//!
//! let request = Request::builder()
//!     .uri("/")
//!     .header(ACCEPT_ENCODING, "gzip")
//!     .body(())
//!     .unwrap();
//!
//! let mut recorder = ResponseRecorder::new();
//! app.handle(request, &mut recorder).await.unwrap();
//!
//! assert_eq!(recorder.headers().get(http::header::CONTENT_ENCODING).unwrap(), "gzip");
//! # }
//! ```

mod app;
mod error;
mod handler;
mod middleware;
mod request;

pub mod encoding;
pub mod transport;
pub mod writer;

pub use app::{App, AppBuilder};
pub use encoding::{Gzip, GzipHandler};
pub use error::Error;
pub use flate2::Compression;
pub use handler::{handler_fn, FnHandler, Handler};
pub use middleware::{IdentityMiddleware, Middleware, MiddlewareStack};
pub use request::RequestContext;
pub use transport::{Connection, Hijack, ResponseRecorder, Transport};
pub use writer::{BeforeHook, ResponseWriter, TransportWriter};
