use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::logging::{log, obj, v_str, Domain, Level, ProfileScope};
use crate::record::{time_extent, year_extent, LapTime, RawRecord, Record};
use crate::retry::{is_retryable_http_status, is_retryable_network_error, retry_async, RetryConfig};

/// Failure to obtain or decode the dataset.
#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(u16),
    Io(std::io::Error),
    Decode(serde_json::Error),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => is_retryable_network_error(e),
            FetchError::Status(code) => is_retryable_http_status(*code),
            FetchError::Io(_) | FetchError::Decode(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "http request failed: {}", e),
            FetchError::Status(code) => write!(f, "unexpected http status {}", code),
            FetchError::Io(e) => write!(f, "read failed: {}", e),
            FetchError::Decode(e) => write!(f, "dataset is not a record array: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            FetchError::Status(_) => None,
            FetchError::Io(e) => Some(e),
            FetchError::Decode(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e)
    }
}

/// Where the JSON document comes from.
#[async_trait]
pub trait DatasetSource {
    /// Short label for logs.
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpSource {
    client: Client,
    url: String,
    retry: RetryConfig,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration, retry: RetryConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            retry,
        })
    }

    async fn fetch_once(&self) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        retry_async(&self.retry, "dataset_fetch", FetchError::is_retryable, || self.fetch_once()).await
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// File source when `DATA_FILE` is set, HTTP otherwise.
pub fn source_from_config(cfg: &Config) -> Result<Box<dyn DatasetSource + Send + Sync>, FetchError> {
    match &cfg.data_file {
        Some(path) => Ok(Box::new(FileSource::new(path))),
        None => {
            let retry = RetryConfig {
                max_retries: cfg.fetch_retries,
                base_delay_ms: cfg.fetch_retry_base_ms,
                ..RetryConfig::default()
            };
            let source = HttpSource::new(&cfg.data_url, Duration::from_secs(cfg.fetch_timeout_secs), retry)?;
            Ok(Box::new(source))
        }
    }
}

/// Decode the JSON array and parse each lap time.
pub fn decode_dataset(bytes: &[u8]) -> Result<Vec<Record>, FetchError> {
    let raw: Vec<RawRecord> = serde_json::from_slice(bytes)?;
    let records: Vec<Record> = raw.into_iter().map(Record::from).collect();
    for rec in records.iter().filter(|r| !r.time.is_valid()) {
        log(
            Level::Warn,
            Domain::Transform,
            "invalid_time",
            obj(&[
                ("name", v_str(&rec.name)),
                ("year", json!(rec.year)),
                ("raw", v_str(&rec.time_raw)),
            ]),
        );
    }
    Ok(records)
}

/// Fetch and decode. Nothing is rendered here.
pub async fn load_dataset(source: &(dyn DatasetSource + Send + Sync)) -> Result<Vec<Record>, FetchError> {
    let (records, _) = load_dataset_with_bytes(source).await?;
    Ok(records)
}

/// Like [`load_dataset`], also returning the raw payload.
pub async fn load_dataset_with_bytes(
    source: &(dyn DatasetSource + Send + Sync),
) -> Result<(Vec<Record>, Vec<u8>), FetchError> {
    let _scope = ProfileScope::with_context("load_dataset", &[("source", v_str(&source.describe()))]);
    log(
        Level::Info,
        Domain::Fetch,
        "fetch_start",
        obj(&[("source", v_str(&source.describe()))]),
    );
    let bytes = match source.fetch().await {
        Ok(bytes) => bytes,
        Err(err) => {
            log(
                Level::Error,
                Domain::Fetch,
                "fetch_failed",
                obj(&[("source", v_str(&source.describe())), ("error", v_str(&err.to_string()))]),
            );
            return Err(err);
        }
    };
    let records = decode_dataset(&bytes)?;
    log(
        Level::Info,
        Domain::Fetch,
        "fetch_done",
        obj(&[("bytes", json!(bytes.len())), ("records", json!(records.len()))]),
    );
    Ok((records, bytes))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub source: String,
    pub hash_sha256: String,
    pub records: usize,
    pub doping_allegations: usize,
    pub invalid_times: usize,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
}

pub fn summarize(source: &str, records: &[Record], raw: &[u8]) -> DatasetSummary {
    let years = year_extent(records);
    let times = time_extent(records);
    DatasetSummary {
        source: source.to_string(),
        hash_sha256: hex::encode(Sha256::digest(raw)),
        records: records.len(),
        doping_allegations: records.iter().filter(|r| r.has_doping_allegation()).count(),
        invalid_times: records.iter().filter(|r| !r.time.is_valid()).count(),
        year_min: years.map(|(lo, _)| lo),
        year_max: years.map(|(_, hi)| hi),
        time_min: times.map(|(lo, _)| LapTime::At(lo).minutes_seconds()),
        time_max: times.map(|(_, hi)| LapTime::At(hi).minutes_seconds()),
    }
}

/// `<name>.summary.json` beside a dataset file; for a URL source, the last
/// path segment in the working directory.
pub fn default_summary_path(source: &str) -> PathBuf {
    let fname = match url::Url::parse(source) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => u
            .path_segments()
            .and_then(|mut segs| segs.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("dataset.json")
            .to_string(),
        _ => {
            let path = Path::new(source);
            let fname = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("dataset.json");
            return path.with_file_name(format!("{}.summary.json", fname));
        }
    };
    PathBuf::from(format!("{}.summary.json", fname))
}
