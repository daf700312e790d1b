//! Stop switch for a running server.
//!
//! Built on a `watch` channel: the stop state is sticky, so a server that
//! subscribes after `trigger()` still stops instead of waiting forever.

use tokio::sync::watch;

/// Owner side, held by `main` or a test.
#[derive(Debug, Clone)]
pub struct Shutdown {
    stopping: watch::Sender<bool>,
}

/// Server side, passed to `HttpServer::run`.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    stopping: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopping, _) = watch::channel(false);
        Self { stopping }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            stopping: self.stopping.subscribe(),
        }
    }

    /// Ask every server holding a `ShutdownSignal` to drain and stop.
    pub fn trigger(&self) {
        self.stopping.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopping.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolves once `trigger()` has been called. Never resolves if the
    /// owning `Shutdown` is dropped untriggered; OS signals still apply.
    pub async fn stopped(mut self) {
        let owner_gone = self.stopping.wait_for(|stopping| *stopping).await.is_err();
        if owner_gone {
            std::future::pending::<()>().await;
        }
    }
}
