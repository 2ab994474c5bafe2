//! HTTP surface: the GraphQL endpoint plus health and info routes

pub mod graphql;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::middleware;

pub use graphql::{build_schema, StockroomSchema};

#[derive(Clone)]
pub struct AppState {
    pub schema: StockroomSchema,
    pub features: FeatureState,
}

impl AppState {
    pub fn new(features: FeatureState) -> Self {
        Self {
            schema: build_schema(features.clone()),
            features,
        }
    }
}

/// Bind to the configured address and serve until `shutdown` resolves
pub async fn serve<S>(config: &Config, features: FeatureState, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = create_router(AppState::new(features), config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .fallback(not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Stockroom",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = &state.features.store;
    store.ping().await.map_err(AppError::StoreUnavailable)?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "store": store.backend(),
        })),
    ))
}

async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}
