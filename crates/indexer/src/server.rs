use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use prometheus_client::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};


async fn get_metrics(Extension(registry): Extension<Arc<Registry>>) -> Response {
    let mut buffer = String::new();
    match prometheus_client::encoding::text::encode(&mut buffer, &registry) {
        Ok(()) => {
            let content_type = HeaderValue::from_static(
                "application/openmetrics-text; version=1.0.0; charset=utf-8"
            );
            ([(CONTENT_TYPE, content_type)], buffer).into_response()
        },
        Err(err) => {
            error!(error =? err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}


pub async fn run_server(registry: Registry, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/metrics", get(get_metrics))
        .layer(Extension(Arc::new(registry)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("metrics server is listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
