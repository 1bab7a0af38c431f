use crate::cancel::CancelToken;
use crate::config::AnalyzerConfig;
use futures::future::join_all;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use url::Url;

/// User agent shared by the page fetch and every link probe.
pub(crate) const USER_AGENT: &str = concat!("pagesift/", env!("CARGO_PKG_VERSION"));

/// Probe every target once and count the unreachable ones.
///
/// Targets are drained from a shared queue by at most `max_workers`
/// concurrent workers; verdicts fan back in over a channel that closes only
/// after every worker has finished, so no dispatched probe is lost. Order of
/// arrival does not matter, the output is a sum.
///
/// Cancellation stops workers from taking new targets; whatever has been
/// counted by then is returned.
pub async fn check_links(config: &AnalyzerConfig, targets: Vec<Url>, cancel: &CancelToken) -> usize {
    if targets.is_empty() {
        return 0;
    }

    let total = targets.len();
    let workers = config.max_workers.clamp(1, total);

    debug!(total, workers, "starting link accessibility check");

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.link_timeout())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .expect("Failed to create link-check client");

    let queue = Arc::new(Mutex::new(VecDeque::from(targets)));
    let (tx, mut rx) = mpsc::channel::<bool>(total);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let client = client.clone();
        let queue = queue.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            let mut checked = 0usize;
            loop {
                if cancel.is_cancelled() {
                    debug!(worker_id, checked, "worker stopping on cancellation");
                    break;
                }

                let target = { queue.lock().await.pop_front() };
                let Some(target) = target else {
                    break;
                };

                let reachable = check_single_link(&client, &target, &cancel).await;
                checked += 1;

                if tx.send(reachable).await.is_err() {
                    // The aggregator went away; nothing left to report to.
                    break;
                }
            }
            debug!(worker_id, checked, "link check worker finished");
        }));
    }
    // The aggregation channel closes once the last worker drops its sender.
    drop(tx);

    let mut inaccessible = 0usize;
    let mut processed = 0usize;
    while let Some(reachable) = rx.recv().await {
        processed += 1;
        if !reachable {
            inaccessible += 1;
        }
    }

    for joined in join_all(handles).await {
        if let Err(err) = joined {
            warn!(error = %err, "link check worker task failed");
        }
    }

    debug!(total, processed, inaccessible, "link accessibility check complete");

    inaccessible
}

/// One HEAD probe. Reachable means a final status in [200, 400) after
/// redirects; every failure mode, timeout, DNS, refused connection or
/// redirect overflow, folds into "unreachable".
async fn check_single_link(client: &Client, target: &Url, cancel: &CancelToken) -> bool {
    let response = tokio::select! {
        response = client.head(target.clone()).send() => response,
        _ = cancel.cancelled() => {
            debug!(%target, "link check abandoned on cancellation");
            return false;
        }
    };

    match response {
        Ok(response) => {
            let status = response.status().as_u16();
            let reachable = (200..400).contains(&status);
            debug!(%target, status, reachable, "link checked");
            reachable
        }
        Err(err) => {
            debug!(%target, error = %err, "link check failed");
            false
        }
    }
}
