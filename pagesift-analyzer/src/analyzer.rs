use crate::cancel::CancelToken;
use crate::checker::{self, USER_AGENT};
use crate::config::AnalyzerConfig;
use crate::document::scan_document;
use crate::error::{AnalyzeError, Result};
use crate::result::AnalysisResult;
use reqwest::Client;
use scraper::Html;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Single-page analyzer: fetches one page, derives its structural facts and
/// probes every outbound link for reachability.
///
/// The instance is cheap to share; each `analyze` call owns its own result
/// and its own probe run.
pub struct Analyzer {
    client: Client,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one page. A fetch failure or a non-2xx status aborts the
    /// whole analysis; individual link failures only feed the unreachable
    /// count.
    pub async fn analyze(&self, target: &str, cancel: &CancelToken) -> Result<AnalysisResult> {
        let started = Instant::now();

        let url = normalize_target(target)?;
        debug!(url = %url, "starting page analysis");

        let mut result = AnalysisResult::new(url.to_string());
        // `Html` is not `Send`; scope it so it is dropped before the
        // `check_links` await below, keeping the returned future `Send`.
        let targets = {
            let document = self.fetch_document(&url, cancel).await?;
            scan_document(&document, &url, &mut result)
        };

        if !targets.is_empty() {
            result.inaccessible_links = checker::check_links(&self.config, targets, cancel).await;
        }

        info!(
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            html_version = %result.html_version,
            internal_links = result.internal_links,
            external_links = result.external_links,
            inaccessible_links = result.inaccessible_links,
            has_login_form = result.has_login_form,
            "page analysis complete"
        );

        Ok(result)
    }

    async fn fetch_document(&self, url: &Url, cancel: &CancelToken) -> Result<Html> {
        let response = tokio::select! {
            response = self.client.get(url.clone()).send() => response?,
            _ = cancel.cancelled() => return Err(AnalyzeError::Cancelled),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzeError::Status(status.as_u16()));
        }

        let body = tokio::select! {
            body = response.text() => body?,
            _ = cancel.cancelled() => return Err(AnalyzeError::Cancelled),
        };

        debug!(url = %url, bytes = body.len(), "page fetched");

        Ok(Html::parse_document(&body))
    }
}

/// Accept bare host names by retrying with an http scheme prepended.
pub fn normalize_target(target: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(target) {
        return Ok(url);
    }

    let with_scheme = format!("http://{target}");
    Url::parse(&with_scheme).map_err(|err| AnalyzeError::InvalidUrl(format!("{target}: {err}")))
}
