use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;

use crate::adapters::tunnel::TunnelDetector;
use crate::app::routes::router;
use crate::app::state::{AppState, VOTE_PAGE};
use crate::config::ServerConfig;
use crate::utils::error::Result;

/// A bound, not yet running, poll server.
pub struct PollServer {
    listener: TcpListener,
    state: AppState,
    tunnel: Option<TunnelDetector>,
    tunnel_interval: std::time::Duration,
}

impl PollServer {
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let address = config.bind_address();
        tracing::debug!("Binding to {}", address);
        let listener = TcpListener::bind(&address).await?;

        // port 0 picks a free port, and links must point at the real one
        let mut state = AppState::from_config(config);
        state.port = listener.local_addr()?.port();

        let tunnel = (!config.no_tunnel)
            .then(|| TunnelDetector::new(config.tunnel_api.clone(), state.tunnel.clone()));

        Ok(Self {
            listener,
            state,
            tunnel,
            tunnel_interval: config.tunnel_interval(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes. Open result streams are ended so the
    /// graceful shutdown does not wait on them forever.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            state,
            tunnel,
            tunnel_interval,
        } = self;

        tracing::info!("Presentation:  http://localhost:{}", state.port);
        tracing::info!("Voting page:   {}{}", state.local_base_url(), VOTE_PAGE);

        let tunnel_task: Option<JoinHandle<()>> = tunnel.map(|detector| {
            tracing::info!("Checking for a tunnel...");
            detector.spawn(tunnel_interval)
        });

        let poll = state.poll.clone();
        let app = router(state);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let closed = poll.disconnect_all();
                tracing::debug!("Closed {} result streams", closed);
            })
            .await;

        if let Some(task) = tunnel_task {
            task.abort();
        }

        tracing::info!("Server shutting down...");
        Ok(served?)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
