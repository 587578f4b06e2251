// crates/devtron-contract-suites/tests/helpers/server.rs
// ============================================================================
// Module: Stub Server
// Description: Loopback axum server running on a dedicated thread.
// Purpose: Host test stubs independently of the test runtime.
// Dependencies: axum, tokio
// ============================================================================

use std::net::TcpListener as StdTcpListener;
use std::thread;

use axum::Router;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Handle for a running stub; dropping it stops the server.
pub struct StubServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    /// Returns `http://127.0.0.1:<port>`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Serves `app` on a free loopback port.
pub fn spawn_router(name: &str, app: Router) -> Result<StubServer, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("{name} bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("{name} listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("{name} local addr failed: {err}"))?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StubServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}
