//! API server — builds the router and starts the HTTP listener.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use b2b_attribution_core::ApiConfig;
use b2b_attribution_engine::{AttributionFacade, ResultWriter, Storage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Owns the HTTP listener configuration and the facade it serves.
pub struct ApiServer<S: Storage, W: ResultWriter> {
    config: ApiConfig,
    facade: Arc<AttributionFacade<S, W>>,
}

impl<S: Storage + 'static, W: ResultWriter + 'static> ApiServer<S, W> {
    pub fn new(config: ApiConfig, facade: Arc<AttributionFacade<S, W>>) -> Self {
        Self { config, facade }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            facade: self.facade.clone(),
            start_time: Instant::now(),
        };

        let b2b_routes = Router::new()
            .route("/attribution/b2b/calculate", post(rest::calculate::<S, W>))
            .route(
                "/attribution/b2b/channel-insights",
                post(rest::channel_insights::<S, W>),
            )
            .route(
                "/attribution/b2b/alignment-report",
                post(rest::alignment_report::<S, W>),
            )
            .route(
                "/attribution/b2b/touchpoint-types",
                get(rest::touchpoint_types::<S, W>),
            )
            .route("/attribution/b2b/model-info", get(rest::model_info::<S, W>))
            .route(
                "/attribution/calculate",
                post(rest::legacy_calculate::<S, W>),
            )
            .with_state(state.clone());

        let ops_routes = Router::new()
            .route("/health", get(rest::health_check::<S, W>))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .with_state(state);

        Router::new()
            .merge(b2b_routes)
            .merge(ops_routes)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Starts the HTTP server and runs until the listener is closed.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
