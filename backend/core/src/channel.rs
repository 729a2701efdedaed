use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the chat platform connection has reported ready. Shared between
/// the channel adapter and the health endpoint.
#[derive(Debug, Default)]
pub struct ConnectionStatus {
    connected: AtomicBool,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Label used by the health report.
    pub fn label(&self) -> &'static str {
        if self.is_connected() {
            "Connected"
        } else {
            "Connecting..."
        }
    }
}
