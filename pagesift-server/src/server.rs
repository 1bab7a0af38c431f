use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use pagesift_analyzer::Analyzer;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, info};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// HTTP front end for the analyzer.
///
/// One shared `Analyzer` serves every request; each connection runs on its
/// own task.
pub struct AppServer {
    config: Config,
    analyzer: Arc<Analyzer>,
    listener: TcpListener,
    started_at: Instant,
}

impl AppServer {
    /// Bind the configured address without accepting yet.
    pub async fn bind(config: Config) -> std::io::Result<Self> {
        let analyzer = Arc::new(Analyzer::new(config.analyzer.clone()));
        let listener = TcpListener::bind(&config.bind_address).await?;

        info!(addr = %listener.local_addr()?, "server listening");

        Ok(Self {
            config,
            analyzer,
            listener,
            started_at: Instant::now(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until ctrl-c. In-flight connections finish on
    /// their own tasks after the accept loop stops.
    pub async fn serve(self) -> std::io::Result<()> {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break;
                }
            };

            let analyzer = self.analyzer.clone();
            let config = self.config.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    handle_request(req, analyzer.clone(), config.clone(), started_at)
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(%remote_addr, error = %err, "connection error");
                }
            });
        }

        info!("server stopped");
        Ok(())
    }
}

/// Route, then decorate: every response gets CORS headers and one access
/// log line.
async fn handle_request(
    req: Request<Incoming>,
    analyzer: Arc<Analyzer>,
    config: Config,
    started_at: Instant,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = match route(req, analyzer, &config, started_at).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    apply_cors(&mut response);

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    Ok(response)
}

async fn route(
    req: Request<Incoming>,
    analyzer: Arc<Analyzer>,
    config: &Config,
    started_at: Instant,
) -> ApiResult<Response<Full<Bytes>>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (&method, path.as_str()) {
        (&Method::GET, "/") => index(),
        (&Method::POST, "/api/v1/analyze") => {
            handlers::analyze::analyze(req, analyzer, config.request_timeout()).await
        }
        (&Method::GET, "/api/v1/health") => handlers::health::health(started_at).await,
        (&Method::OPTIONS, _) => preflight(),
        (_, "/" | "/api/v1/analyze" | "/api/v1/health") => Err(ApiError::MethodNotAllowed {
            message: format!("{method} is not supported on {path}"),
        }),
        _ => Err(ApiError::NotFound {
            message: format!("no route for {path}"),
        }),
    }
}

fn index() -> ApiResult<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from_static(INDEX_HTML.as_bytes())))?)
}

fn preflight() -> ApiResult<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))?)
}

fn apply_cors(response: &mut Response<Full<Bytes>>) {
    let headers = response.headers_mut();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type"),
    );
}
