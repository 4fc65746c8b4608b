//! emberio - event-driven TCP server runtime.
//!
//! A single-threaded reactor over edge-triggered readiness polling (epoll on
//! Linux, kqueue on other Unix systems, via mio). One I/O thread accepts
//! thousands of concurrent connections, drains inbound bytes as they arrive,
//! and queues outbound bytes for backpressure-aware delivery. Application
//! logic plugs in through the [`EventHandler`] callbacks.
//!
//! # Quick start
//!
//! ```ignore
//! use emberio::{Endpoint, EventHandler, Listener, Reactor, ReactorCtx, ConnToken};
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! struct Echo;
//!
//! impl EventHandler for Echo {
//!     fn on_message(&mut self, ctx: &mut ReactorCtx, conn: ConnToken, data: &[u8]) {
//!         ctx.send(conn, Bytes::copy_from_slice(data));
//!     }
//! }
//!
//! let endpoint = Endpoint::v4("0.0.0.0", 9180)?;
//! let listener = Listener::bind(&endpoint, None)?;
//!
//! let mut reactor = Reactor::builder().max_fds(65536).build(Echo)?;
//! reactor.register_listener(listener)?;
//! emberio::signal::install(reactor.stop_handle());
//! reactor.run(Some(Duration::from_millis(1000)))?;
//! ```
//!
//! # Model
//!
//! - **Single-threaded, cooperative.** The thread inside [`Reactor::run`]
//!   executes the event loop and every callback. Callbacks must not block;
//!   offload slow work and hand results back through a queue drained in
//!   [`EventHandler::on_tick`]. The one cross-thread entry point is
//!   [`StopHandle`], safe from any thread or a signal handler.
//! - **No framing.** Inbound bytes surface in whatever chunks the kernel
//!   returns; per connection, chunk order and byte order match the wire.
//! - **Backpressure.** [`ReactorCtx::send`] queues bytes; a full kernel
//!   buffer leaves the remainder queued and the loop resumes on write
//!   readiness, preserving order.
//! - **Deferred close.** [`ReactorCtx::close`] takes effect once queued
//!   writes have drained, so `send` then `close` delivers every byte.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod signal;

mod buffer;
mod connection;
mod endpoint;
mod error;
mod fd;
mod handler;
mod listener;
mod poller;
mod reactor;

pub use buffer::Buffer;
pub use config::Config;
pub use connection::Connection;
pub use endpoint::{Endpoint, Family};
pub use error::{Error, Result};
pub use fd::Descriptor;
pub use handler::{ConnToken, EventHandler};
pub use listener::Listener;
pub use reactor::{Reactor, ReactorBuilder, ReactorCtx, StopHandle};
