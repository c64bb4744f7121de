use crate::error::ToolPrepError;
use crate::verification::ChecksumSpec;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// One URL to fetch, with what the caller expects from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub checksum: Option<ChecksumSpec>,
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    /// Ask the server not to apply a content encoding to the body.
    pub ignore_encoding: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            checksum: None,
            cookies: BTreeMap::new(),
            headers: BTreeMap::new(),
            ignore_encoding: false,
        }
    }

    pub fn with_checksum(mut self, checksum: ChecksumSpec) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn with_cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn ignoring_encoding(mut self) -> Self {
        self.ignore_encoding = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// Buffer the body in memory; used for pages that get scraped.
    InMemory,
    /// Stream the body to a temporary file; used for artifacts.
    Persist,
}

#[derive(Debug)]
pub enum Payload {
    Empty,
    Buffer(Vec<u8>),
    File(NamedTempFile),
}

#[derive(Debug)]
pub struct DownloadResult {
    pub url: String,
    pub final_url: Option<String>,
    pub cookies: BTreeMap<String, String>,
    pub payload: Payload,
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            final_url: None,
            cookies: BTreeMap::new(),
            payload: Payload::Empty,
            error: Some(reason.into()),
        }
    }

    pub fn buffered(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let url = url.into();
        Self {
            final_url: Some(url.clone()),
            url,
            cookies: BTreeMap::new(),
            payload: Payload::Buffer(body.into()),
            error: None,
        }
    }

    /// Turns a captured fetch error into a transport error.
    pub fn check(&self) -> Result<(), ToolPrepError> {
        match &self.error {
            Some(reason) => Err(ToolPrepError::transport(&self.url, reason)),
            None => Ok(()),
        }
    }

    pub fn bytes(&self) -> Result<&[u8], ToolPrepError> {
        self.check()?;
        match &self.payload {
            Payload::Buffer(body) => Ok(body),
            Payload::Empty => Ok(&[]),
            Payload::File(_) => Err(ToolPrepError::transport(
                &self.url,
                "content was persisted to disk, not buffered",
            )),
        }
    }

    pub fn text(&self) -> Result<Cow<'_, str>, ToolPrepError> {
        Ok(String::from_utf8_lossy(self.bytes()?))
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.payload {
            Payload::File(file) => Some(file.path()),
            _ => None,
        }
    }

    /// URL the content was finally served from, after redirects.
    pub fn effective_url(&self) -> &str {
        self.final_url.as_deref().unwrap_or(&self.url)
    }
}

/// Results of one batch, keyed by requested URL.
#[derive(Debug, Default)]
pub struct DownloadBatch {
    results: HashMap<String, DownloadResult>,
}

impl DownloadBatch {
    pub fn insert(&mut self, result: DownloadResult) {
        self.results.insert(result.url.clone(), result);
    }

    pub fn get(&self, url: &str) -> Result<&DownloadResult, ToolPrepError> {
        self.results
            .get(url)
            .ok_or_else(|| ToolPrepError::transport(url, "no result was produced for this URL"))
    }

    pub fn take(&mut self, url: &str) -> Result<DownloadResult, ToolPrepError> {
        self.results
            .remove(url)
            .ok_or_else(|| ToolPrepError::transport(url, "no result was produced for this URL"))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.values()
    }
}

impl FromIterator<DownloadResult> for DownloadBatch {
    fn from_iter<T: IntoIterator<Item = DownloadResult>>(iter: T) -> Self {
        let mut batch = Self::default();
        for result in iter {
            batch.insert(result);
        }
        batch
    }
}

#[derive(Clone, Debug)]
pub struct DownloadOptions {
    pub parallelism: usize,
    pub user_agent: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            parallelism: 8,
            user_agent: None,
            request_timeout: None,
        }
    }
}
