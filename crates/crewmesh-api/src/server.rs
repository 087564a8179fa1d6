//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use crewmesh_core::Coordinator;

use crate::routes::create_router;
use crate::state::AppState;

/// Server bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// The coordination HTTP server.
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, coordinator: Arc<Coordinator>) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(coordinator)),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until `shutdown` fires.
    pub async fn run(
        &self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Coordination server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("Server shutting down");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewmesh_core::CoordConfig;

    #[test]
    fn default_bind_address() {
        let coordinator = Arc::new(Coordinator::new(CoordConfig::default()));
        let server = ApiServer::new(ApiConfig::default(), coordinator);
        assert_eq!(server.addr(), "127.0.0.1:8080");
    }
}
