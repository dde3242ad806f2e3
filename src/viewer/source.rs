use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Please choose a .json file (got {0})")]
    NotJson(String),

    /// Only the file name is kept so messages never reveal server paths
    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is outside the log directory")]
    OutsideLogDir(String),

    #[error("Loading from a file path is disabled")]
    FileLoadsDisabled,

    #[error("Loading from a URL is disabled")]
    RemoteLoadsDisabled,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Where a raw log comes from. The engine does not care which one.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Display name shown as the log file name
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn is_json_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

/// Bytes already received, e.g. an uploaded file
#[derive(Debug)]
pub struct UploadSource {
    filename: String,
    bytes: Vec<u8>,
}

impl UploadSource {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SourceError> {
        let filename = filename.into();
        if !is_json_filename(&filename) {
            return Err(SourceError::NotJson(filename));
        }
        Ok(Self { filename, bytes })
    }
}

#[async_trait]
impl LogSource for UploadSource {
    fn name(&self) -> String {
        self.filename.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(self.bytes.clone())
    }
}

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        if !is_json_filename(&path.to_string_lossy()) {
            return Err(SourceError::NotJson(file_name_of(&path)));
        }
        Ok(Self { path })
    }

    /// A path relative to `root` that must stay inside it, symlinks included
    pub async fn within(root: &Path, location: &str) -> Result<Self, SourceError> {
        let relative = Path::new(location);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SourceError::OutsideLogDir(file_name_of(relative)));
        }

        let source = Self::new(root.join(relative))?;
        let io_error = |source| SourceError::Io {
            name: file_name_of(relative),
            source,
        };
        let root = tokio::fs::canonicalize(root).await.map_err(io_error)?;
        let resolved = tokio::fs::canonicalize(&source.path)
            .await
            .map_err(io_error)?;
        if !resolved.starts_with(&root) {
            warn!(location, "Refusing log path that resolves outside the log directory");
            return Err(SourceError::OutsideLogDir(file_name_of(relative)));
        }

        Ok(Self { path: resolved })
    }
}

#[async_trait]
impl LogSource for FileSource {
    fn name(&self) -> String {
        file_name_of(&self.path)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                name: self.name(),
                source,
            })?;
        debug!(len = bytes.len(), "Read log file");
        Ok(bytes)
    }
}

#[derive(Debug)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl LogSource for HttpSource {
    /// Last path segment of the URL
    fn name(&self) -> String {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.url)
            .to_string()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SourceError::Request {
                url: self.url.clone(),
                source,
            })?;
        debug!(len = bytes.len(), "Fetched remote log");
        Ok(bytes.to_vec())
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// `http(s)://` locations are fetched, anything else is read from disk.
/// Unrestricted: only for locations the operator configured.
pub fn source_for_location(
    location: &str,
    timeout: Duration,
) -> Result<Box<dyn LogSource>, SourceError> {
    let location = location.trim();
    if is_remote(location) {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)?))
    }
}

/// What a client may ask the server to load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadScope {
    /// Root for file loads; `None` disables them
    pub log_dir: Option<PathBuf>,
    pub allow_remote: bool,
    pub fetch_timeout: Duration,
}

impl LoadScope {
    /// Resolves a client-supplied location against this scope
    pub async fn source_for(&self, location: &str) -> Result<Box<dyn LogSource>, SourceError> {
        let location = location.trim();
        if is_remote(location) {
            if !self.allow_remote {
                return Err(SourceError::RemoteLoadsDisabled);
            }
            return Ok(Box::new(HttpSource::new(location, self.fetch_timeout)?));
        }

        let root = self
            .log_dir
            .as_deref()
            .ok_or(SourceError::FileLoadsDisabled)?;
        Ok(Box::new(FileSource::within(root, location).await?))
    }
}
