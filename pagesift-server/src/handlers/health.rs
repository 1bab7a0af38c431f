use crate::error::ApiResult;
use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub version: &'static str,
}

/// GET /api/v1/health
pub async fn health(started_at: Instant) -> ApiResult<Response<Full<Bytes>>> {
    let health = HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        uptime_secs: started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };

    debug!(uptime_secs = health.uptime_secs, "health check");

    let body = serde_json::to_string(&health)?;
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))?)
}
