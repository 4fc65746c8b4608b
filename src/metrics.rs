//! Runtime metrics.
//!
//! All counters are updated from the I/O thread. Export is left to the
//! embedder; iterate `metriken::metrics()` to scrape.

use metriken::{Counter, Gauge, metric};

#[metric(
    name = "connections_accepted",
    description = "Total number of connections accepted"
)]
pub static CONNECTIONS_ACCEPTED: Counter = Counter::new();

#[metric(
    name = "connections_active",
    description = "Number of currently open connections"
)]
pub static CONNECTIONS_ACTIVE: Gauge = Gauge::new();

#[metric(
    name = "connections_closed",
    description = "Total number of connections closed"
)]
pub static CONNECTIONS_CLOSED: Counter = Counter::new();

#[metric(
    name = "bytes_received",
    description = "Total bytes drained from client sockets"
)]
pub static BYTES_RECEIVED: Counter = Counter::new();

#[metric(
    name = "bytes_sent",
    description = "Total bytes handed to the kernel for transmission"
)]
pub static BYTES_SENT: Counter = Counter::new();

#[metric(
    name = "accept_backoffs",
    description = "Accept loop bail-outs due to resource exhaustion"
)]
pub static ACCEPT_BACKOFFS: Counter = Counter::new();
