// Where the raw CSV text comes from.
//
// Sources are tried once each, in configured order; the first success wins.
use crate::config::{AppConfig, HttpConfig, SourceConfig, SourceKind};
use crate::error::SourceError;
use reqwest::blocking::Client;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub trait CsvSource {
    /// URL or path, for logs and messages.
    fn location(&self) -> &str;
    fn fetch(&self) -> Result<String, SourceError>;
}

pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, http: &HttpConfig) -> Result<Self, SourceError> {
        let url = url.into();
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.timeout())
            .build()
            .map_err(|e| SourceError::Http {
                location: url.clone(),
                detail: e.to_string(),
            })?;
        Ok(Self { url, client })
    }
}

impl CsvSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String, SourceError> {
        let http_err = |e: reqwest::Error| SourceError::Http {
            location: self.url.clone(),
            detail: e.to_string(),
        };
        let response = self.client.get(&self.url).send().map_err(http_err)?;
        let status = response.status();
        info!(url = %self.url, status = status.as_u16(), "source responded");
        if !status.is_success() {
            return Err(SourceError::Status {
                location: self.url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(http_err)
    }
}

pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

impl CsvSource for FileSource {
    fn location(&self) -> &str {
        &self.display
    }

    fn fetch(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            location: self.display.clone(),
            source,
        })
    }
}

/// Text returned by the first source that answered.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub text: String,
    pub location: String,
    /// Zero for the primary source.
    pub attempt: usize,
}

pub struct SourceChain {
    sources: Vec<Box<dyn CsvSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn CsvSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let sources = config
            .sources
            .iter()
            .map(|s| build_source(s, &config.http))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(sources))
    }

    pub fn fetch(&self) -> Result<Fetched, SourceError> {
        for (attempt, source) in self.sources.iter().enumerate() {
            info!(location = source.location(), attempt, "fetching renewable share CSV");
            match source.fetch() {
                Ok(text) => {
                    info!(location = source.location(), bytes = text.len(), "fetched CSV");
                    return Ok(Fetched {
                        text,
                        location: source.location().to_string(),
                        attempt,
                    });
                }
                Err(e) => warn!(location = source.location(), error = %e, "source failed"),
            }
        }
        error!(sources = self.sources.len(), "no source could be fetched");
        Err(SourceError::Exhausted)
    }
}

fn build_source(
    source: &SourceConfig,
    http: &HttpConfig,
) -> Result<Box<dyn CsvSource>, SourceError> {
    let built: Box<dyn CsvSource> = match source.kind {
        SourceKind::Http => Box::new(HttpSource::new(source.location.clone(), http)?),
        SourceKind::File => Box::new(FileSource::new(&source.location)),
    };
    Ok(built)
}
