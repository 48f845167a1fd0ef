mod core;
mod features;
mod shared;

use crate::core::config::{Config, SwaggerConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::categories::{
    routes as categories_routes, BackendCategoryClient, CategoryApi, CategoryService,
};
use anyhow::Context;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, backend={}",
        worker_threads,
        config.backend.api_base_url
    );

    let backend_client = BackendCategoryClient::new(&config.backend)
        .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;
    let category_api: Arc<dyn CategoryApi> = Arc::new(backend_client);
    let category_service = Arc::new(CategoryService::new(category_api));
    tracing::info!("Category service initialized");

    let app = build_router(&config, category_service);

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

fn swagger_router(swagger: &SwaggerConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: swagger.title.clone(),
        version: swagger.version.clone(),
        description: swagger.description.clone(),
    }
    .modify(&mut openapi);

    let router =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    match swagger.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            router.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
        }
        None => {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            router
        }
    }
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

fn build_router(config: &Config, category_service: Arc<CategoryService>) -> Router {
    Router::new()
        .merge(swagger_router(&config.swagger))
        .route("/health", axum::routing::get(health_check))
        .merge(categories_routes::public_routes(Arc::clone(&category_service)))
        .nest(
            "/api/admin",
            categories_routes::admin_routes(category_service),
        )
        .layer(middleware::cors_layer(
            &config.app.cors_allowed_origins,
            &config.app.frontend_url,
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

/// TCP listener tuned through socket2
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, BackendConfig};
    use crate::shared::test_helpers::{catalog, InMemoryCategoryApi};
    use axum_test::TestServer;

    fn config(credentials: Option<(&str, &str)>) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origins: vec!["*".to_string()],
                frontend_url: "http://localhost:3000".to_string(),
            },
            backend: BackendConfig {
                api_base_url: "http://backend.invalid".to_string(),
                api_token: None,
                timeout: None,
            },
            swagger: SwaggerConfig {
                username: credentials.map(|(u, _)| u.to_string()),
                password: credentials.map(|(_, p)| p.to_string()),
                title: "Test".to_string(),
                version: "0.0.0".to_string(),
                description: "Test".to_string(),
            },
        }
    }

    fn server(credentials: Option<(&str, &str)>) -> TestServer {
        let service = Arc::new(CategoryService::new(Arc::new(InMemoryCategoryApi::with(
            catalog(),
        ))));
        TestServer::new(build_router(&config(credentials), service)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        server(None).get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let response = server(None).get("/api/categories").await;

        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_openapi_is_guarded_when_configured() {
        let response = server(Some(("admin", "tajne")))
            .get("/api-docs/openapi.json")
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_admin_routes_are_nested() {
        let response = server(None).get("/api/admin/categories/_/parent-options").await;

        response.assert_status_ok();
    }

    #[test]
    fn test_bind_listener_rejects_bad_address() {
        assert!(bind_listener("not-an-address").is_err());
    }
}
