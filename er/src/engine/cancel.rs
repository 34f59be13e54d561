//! Cooperative cancellation between the signal listener and the engine

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Create a connected handle/signal pair
pub fn cancel_channel() -> (CancelHandle, CancelSignal) {
    // One slot: a pending request is a request, repeats collapse into it
    let (tx, rx) = mpsc::channel(1);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Sending side, held by whoever may request a stop (Ctrl+C listener, tests)
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: mpsc::Sender<()>,
}

impl CancelHandle {
    /// Request cancellation. Returns false once the receiving side is gone.
    pub fn cancel(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                debug!("cancel: request already pending");
                true
            }
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// Receiving side, polled by the engine at cycle boundaries
#[derive(Debug)]
pub struct CancelSignal {
    rx: mpsc::Receiver<()>,
}

impl CancelSignal {
    /// Consume a pending request, if any, without waiting
    pub fn is_requested(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Wait until a request arrives. Never completes once every handle is dropped.
    pub async fn requested(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    /// Discard requests that piled up while nobody was listening
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        debug!(drained, "drain: called");
        drained
    }
}
