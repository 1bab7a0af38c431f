use crate::error::{ApiError, ApiResult};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use pagesift_analyzer::{AnalysisResult, Analyzer, CancelToken};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /api/v1/analyze
///
/// A failed analysis still answers 200; the failure travels in the result's
/// `error` field so the caller always gets the same record shape back.
pub async fn analyze(
    req: Request<Incoming>,
    analyzer: Arc<Analyzer>,
    request_timeout: Duration,
) -> ApiResult<Response<Full<Bytes>>> {
    let body = req.into_body().collect().await?.to_bytes();

    let request: AnalyzeRequest = serde_json::from_slice(&body).map_err(|err| {
        ApiError::BadRequest {
            message: format!("invalid request body: {err}"),
        }
    })?;

    if request.url.is_empty() {
        return Err(ApiError::BadRequest {
            message: "url is required".to_string(),
        });
    }

    info!(url = %request.url, "analysis requested");

    let cancel = CancelToken::new();
    let outcome =
        tokio::time::timeout(request_timeout, analyzer.analyze(&request.url, &cancel)).await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(url = %request.url, error = %err, "analysis failed");
            AnalysisResult::with_error(request.url, err.to_string())
        }
        Err(_) => {
            // Budget exhausted: stop any in-flight probe workers.
            cancel.cancel();
            warn!(
                url = %request.url,
                timeout_secs = request_timeout.as_secs(),
                "analysis timed out"
            );
            AnalysisResult::with_error(request.url, "analysis timed out".to_string())
        }
    };

    let body = serde_json::to_string(&result)?;
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))?)
}
