//! Ctrl+C listener feeding the engine's cancel channel

use std::io;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::CancelHandle;

/// Forward every interrupt to `handle` until its receiving side goes away.
///
/// The handler is registered before this returns, so from then on SIGINT no
/// longer terminates the process. Must be called inside a tokio runtime.
#[cfg(unix)]
pub fn spawn_interrupt_listener(handle: CancelHandle) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    debug!("spawn_interrupt_listener: called");
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            info!("SIGINT received");
            if !handle.cancel() {
                debug!("spawn_interrupt_listener: cancel receiver gone, exiting");
                break;
            }
        }
    }))
}

/// Forward every Ctrl+C to `handle` until its receiving side goes away.
#[cfg(not(unix))]
pub fn spawn_interrupt_listener(handle: CancelHandle) -> io::Result<JoinHandle<()>> {
    debug!("spawn_interrupt_listener: called");
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
            if !handle.cancel() {
                break;
            }
        }
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::cancel_channel;
    use nix::sys::signal::{Signal, raise};
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigint_becomes_cancel_request() {
        let (handle, mut signal) = cancel_channel();
        let listener = spawn_interrupt_listener(handle).unwrap();

        raise(Signal::SIGINT).unwrap();
        tokio::time::timeout(Duration::from_secs(5), signal.requested())
            .await
            .expect("SIGINT should be forwarded as a cancel request");

        listener.abort();
    }
}
