// src/utils/common.rs

use axum::{http::StatusCode, routing::get, serve, Router};
use prometheus::{gather, Encoder, TextEncoder};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Result;

// Axum handler for /metrics
async fn metrics_handler() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&gather(), &mut buffer) {
        error!("Could not encode prometheus metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Could not encode prometheus metrics: {}", e),
        );
    }
    match String::from_utf8(buffer) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => {
            error!("Prometheus metrics UTF-8 error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prometheus metrics UTF-8 error: {}", e),
            )
        }
    }
}

pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves `/metrics` on `port` in a background task. Does nothing without a port.
pub async fn setup_prometheus_metrics(metrics_port: Option<u16>) -> Result<()> {
    let Some(port) = metrics_port else {
        info!("Prometheus metrics endpoint not configured (no port specified).");
        return Ok(());
    };

    let listener_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&listener_addr).await?;
    info!(
        "Metrics endpoint will be available at http://{}/metrics",
        listener_addr
    );
    tokio::spawn(async move {
        if let Err(e) = serve(listener, metrics_router()).await {
            error!("Metrics server error: {}", e);
        }
    });
    Ok(())
}
