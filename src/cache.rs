// On-disk cache of the last parsed observation set.
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::types::Observation;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CacheItem {
    timestamp: DateTime<Utc>,
    data: Vec<Observation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub has_cache: bool,
    pub age: Option<Duration>,
}

pub struct ObservationCache {
    path: PathBuf,
    ttl: Duration,
}

impl ObservationCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.path, Duration::hours(i64::from(config.ttl_hours)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached observations, or `None` when there is no usable entry.
    /// An expired entry is deleted.
    pub fn load(&self) -> Option<Vec<Observation>> {
        self.load_at(Utc::now())
    }

    fn load_at(&self, now: DateTime<Utc>) -> Option<Vec<Observation>> {
        let item = match self.read() {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!(path = %self.path.display(), "cache miss");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache unreadable, ignoring");
                return None;
            }
        };
        if now - item.timestamp > self.ttl {
            debug!(path = %self.path.display(), "cache expired");
            if let Err(e) = self.clear() {
                warn!(error = %e, "could not remove expired cache");
            }
            return None;
        }
        debug!(records = item.data.len(), "cache hit");
        Some(item.data)
    }

    pub fn store(&self, data: &[Observation]) -> Result<(), CacheError> {
        self.store_at(data, Utc::now())
    }

    fn store_at(&self, data: &[Observation], timestamp: DateTime<Utc>) -> Result<(), CacheError> {
        let item = CacheItem {
            timestamp,
            data: data.to_vec(),
        };
        std::fs::write(&self.path, serde_json::to_string(&item)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Reports what is on disk without applying the TTL; an expired entry
    /// shows up here until the next `load` removes it.
    pub fn status(&self) -> CacheStatus {
        match self.read() {
            Ok(Some(item)) => CacheStatus {
                has_cache: true,
                age: Some(Utc::now() - item.timestamp),
            },
            _ => CacheStatus {
                has_cache: false,
                age: None,
            },
        }
    }

    fn read(&self) -> Result<Option<CacheItem>, CacheError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

/// `3h 12m ago` / `5m ago`.
pub fn format_age(age: Duration) -> String {
    let hours = age.num_hours();
    let minutes = age.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m ago", hours, minutes)
    } else {
        format!("{}m ago", minutes)
    }
}
