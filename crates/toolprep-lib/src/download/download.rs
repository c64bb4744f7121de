use super::types::{DownloadBatch, DownloadOptions, DownloadRequest, DownloadResult, FetchMode, Payload};
use crate::error::ToolPrepError;
use eyre::{Result, WrapErr};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::header::{ACCEPT_ENCODING, COOKIE};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Fetches batches of URLs.
///
/// The returned future resolves once every request of the batch has
/// terminated, successfully or not. Per-URL failures are recorded in the
/// matching [`DownloadResult::error`] and never abort the rest of the batch.
pub trait Fetch {
    fn fetch(
        &self,
        requests: Vec<DownloadRequest>,
        mode: FetchMode,
    ) -> impl Future<Output = DownloadBatch> + Send;
}

pub struct DownloadCenter {
    client: reqwest::Client,
    options: DownloadOptions,
}

impl DownloadCenter {
    pub fn new(options: DownloadOptions) -> Result<Self, ToolPrepError> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, options))
    }

    pub fn with_client(client: reqwest::Client, options: DownloadOptions) -> Self {
        Self { client, options }
    }

    async fn fetch_one(&self, request: &DownloadRequest, mode: FetchMode) -> Result<DownloadResult> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.cookies.is_empty() {
            builder = builder.header(COOKIE, cookie_header(&request.cookies));
        }
        if request.ignore_encoding {
            builder = builder.header(ACCEPT_ENCODING, "identity");
        }

        let mut response = builder
            .send()
            .await
            .wrap_err("Request failed")?
            .error_for_status()
            .wrap_err("Server returned an error status")?;

        let final_url = response.url().to_string();
        let cookies: BTreeMap<String, String> = response
            .cookies()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();

        let payload = match mode {
            FetchMode::InMemory => {
                let body = response.bytes().await.wrap_err("Failed to read body")?;
                Payload::Buffer(body.to_vec())
            }
            FetchMode::Persist => {
                let file = tempfile::Builder::new()
                    .prefix("toolprep-")
                    .tempfile()
                    .wrap_err("Failed to create temporary file")?;
                let handle = file.reopen().wrap_err("Failed to open temporary file")?;
                let mut writer = tokio::io::BufWriter::new(tokio::fs::File::from_std(handle));

                while let Some(chunk) = response.chunk().await.wrap_err("Failed to read body")? {
                    writer
                        .write_all(&chunk)
                        .await
                        .wrap_err_with(|| format!("Failed to write to {}", file.path().display()))?;
                }
                writer
                    .flush()
                    .await
                    .wrap_err_with(|| format!("Failed to flush {}", file.path().display()))?;
                Payload::File(file)
            }
        };

        Ok(DownloadResult {
            url: request.url.clone(),
            final_url: Some(final_url),
            cookies,
            payload,
            error: None,
        })
    }
}

impl Fetch for DownloadCenter {
    async fn fetch(&self, requests: Vec<DownloadRequest>, mode: FetchMode) -> DownloadBatch {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.options.parallelism.max(1)));

        let mut futs = FuturesUnordered::new();
        for request in requests {
            let semaphore = semaphore.clone();
            futs.push(async move {
                let _permit = semaphore.acquire_owned().await;
                debug!(url = %request.url, ?mode, "Fetching");
                match self.fetch_one(&request, mode).await {
                    Ok(result) => {
                        info!(url = %request.url, final_url = ?result.final_url, "Fetched");
                        result
                    }
                    Err(err) => {
                        warn!(url = %request.url, "Fetch failed: {:#}", err);
                        DownloadResult::failed(&request.url, format!("{err:#}"))
                    }
                }
            });
        }

        let mut batch = DownloadBatch::default();
        while let Some(result) = futs.next().await {
            batch.insert(result);
        }
        batch
    }
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
