//! IndexNow change notifications
//!
//! Tells participating search engines that storefront URLs changed. Every
//! submission runs on a spawned task; failures are logged and dropped.
//! Outstanding submissions are awaited by [`IndexNotifier::flush`] during
//! shutdown.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::sitemap::{category_path, product_path};
use crate::shared::errors::InfraError;

pub const DEFAULT_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

/// Receives notifications about catalog changes. Must not block the caller.
#[async_trait]
pub trait IndexNotifier: Send + Sync {
    fn notify(&self, urls: Vec<String>);

    /// Wait for submissions that are still in flight.
    async fn flush(&self) {}

    fn product_changed(&self, product_id: Option<i32>) {
        self.notify(product_urls(product_id));
    }

    fn category_changed(&self, category_id: Option<i32>) {
        self.notify(category_urls(category_id));
    }
}

pub fn product_urls(product_id: Option<i32>) -> Vec<String> {
    let mut urls = vec!["/products".to_string(), "/sitemap_products.xml".to_string()];
    urls.extend(product_id.map(product_path));
    urls
}

pub fn category_urls(category_id: Option<i32>) -> Vec<String> {
    let mut urls = vec![
        "/categories".to_string(),
        "/sitemap_categories.xml".to_string(),
    ];
    urls.extend(category_id.map(category_path));
    urls
}

/// Used when IndexNow is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl IndexNotifier for NoopNotifier {
    fn notify(&self, _urls: Vec<String>) {}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPayload<'a> {
    host: &'a str,
    key: &'a str,
    url_list: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IndexNowClient {
    client: reqwest::Client,
    endpoint: String,
    host: String,
    key: String,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl IndexNowClient {
    pub fn new(
        endpoint: impl Into<String>,
        host: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            host: host.into(),
            key: key.into(),
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    fn pending_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Submissions spawned and not yet reaped.
    pub fn pending(&self) -> usize {
        self.pending_tasks().len()
    }

    /// Prefix relative URLs with `https://{host}`.
    pub fn absolutize(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("https://{}{}", self.host, url)
        }
    }

    /// Submit one batch. `Ok(false)` means the endpoint answered with
    /// something other than 200/202.
    pub async fn submit(&self, urls: &[String]) -> Result<bool, InfraError> {
        let payload = SubmitPayload {
            host: &self.host,
            key: &self.key,
            url_list: urls.iter().map(|u| self.absolutize(u)).collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        if matches!(status, 200 | 202) {
            info!(count = urls.len(), "IndexNow submission accepted");
            Ok(true)
        } else {
            warn!(status, count = urls.len(), "IndexNow submission rejected");
            Ok(false)
        }
    }
}

#[async_trait]
impl IndexNotifier for IndexNowClient {
    fn notify(&self, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }
        let client = self.clone();
        let mut pending = self.pending_tasks();
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            let ok = client.submit(&urls).await.unwrap_or_else(|e| {
                warn!(error = %e, "IndexNow submission failed");
                false
            });
            metrics::counter!("indexnow_submissions_total", "accepted" => ok.to_string())
                .increment(1);
        });
    }

    async fn flush(&self) {
        let mut tasks = std::mem::take(&mut *self.pending_tasks());
        if tasks.is_empty() {
            return;
        }
        debug!(pending = tasks.len(), "Waiting for IndexNow submissions");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "IndexNow submission task failed");
            }
        }
    }
}
