//! Signal handling for graceful shutdown.
//!
//! Bridges SIGINT/SIGTERM to a reactor [`StopHandle`].

use crate::reactor::StopHandle;

/// Install signal handlers that stop the reactor.
///
/// The first SIGINT or SIGTERM requests a graceful stop; a second one
/// force-exits the process.
///
/// # Example
///
/// ```ignore
/// let mut reactor = Reactor::new(handler)?;
/// emberio::signal::install(reactor.stop_handle());
/// reactor.run(Some(Duration::from_millis(1000)))?;
/// ```
pub fn install(stop: StopHandle) {
    ctrlc::set_handler(move || {
        if stop.is_stopped() {
            tracing::warn!("received second signal, forcing immediate exit");
            std::process::exit(1);
        }
        tracing::info!("received shutdown signal, stopping event loop");
        stop.stop();
    })
    .expect("failed to set signal handler");
}
