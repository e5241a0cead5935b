pub mod handlers;
pub mod models;
pub mod router;

use crate::config::Config;
use crate::service::FundingService;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state handed to every handler.
pub struct AppState {
    pub service: FundingService,
    pub config: Config,
}

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(service: FundingService, config: Config) -> Self {
        Self {
            state: Arc::new(AppState { service, config }),
        }
    }

    /// Binds the server to the configured port and serves until `shutdown` resolves.
    pub async fn run(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let app = router::build(Arc::clone(&self.state))
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.api_port));
        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
