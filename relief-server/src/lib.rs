//! Relief Server - REST API over the relief services, built on hyper 1.x.
//!
//! One task per connection, JSON in and out, CORS headers on every response,
//! and graceful shutdown driven by a `watch` channel.

pub mod server;
pub mod router;
pub mod response;
mod handlers;
mod multipart;

pub use router::{Route, RouteError};
pub use server::{start, ServerHandle};
