//! On-disk JSON cache with TTL-by-field semantics.
//!
//! One file per entry, named from a canonicalized key. Every entry carries
//! the epoch-millisecond timestamp it was written at; the read path treats
//! a stale timestamp, a missing file and a corrupt file all as a miss.
//! There is no locking: two writers for the same key race and the last
//! writer wins, which is accepted (eventually-cached, not exactly-once).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Creates the cache directory if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<FileCache, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileCache { dir })
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Returns the payload stored under `key` if it was written less than
    /// `ttl` ago. Unreadable or unparseable entries count as a miss.
    pub fn read_fresh<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Option<T> {
        let path = self.entry_path(key);
        let entry = read_entry::<T>(&path)?;
        let age = Utc::now().timestamp_millis() - entry.timestamp;

        if age < 0 || age as u128 >= ttl.as_millis() {
            debug!("cache entry {} expired ({}ms old)", key, age);
            return None;
        }

        Some(entry.payload)
    }

    /// Persists `payload` under `key` with a fresh timestamp.
    pub fn write<T: Serialize>(&self, key: &str, payload: &T) -> Result<(), Error> {
        let entry = CacheEntry {
            timestamp: Utc::now().timestamp_millis(),
            payload,
        };
        let data = serde_json::to_string(&entry)?;
        fs::write(self.entry_path(key), data)?;
        Ok(())
    }
}

fn read_entry<T: DeserializeOwned>(path: &Path) -> Option<CacheEntry<T>> {
    if !path.exists() {
        return None;
    }

    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            warn!("cache read error for {}: {}", path.display(), err);
            return None;
        }
    };

    match serde_json::from_str(&data) {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!("corrupt cache entry {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        price: f64,
    }

    #[test]
    fn round_trips_within_ttl() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        cache.write("price_1_0xabc", &Payload { price: 3.5 }).unwrap();
        let got: Option<Payload> =
            cache.read_fresh("price_1_0xabc", Duration::from_secs(60));

        assert_eq!(got, Some(Payload { price: 3.5 }));
    }

    #[test]
    fn zero_ttl_means_always_stale() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        cache.write("k", &Payload { price: 1.0 }).unwrap();
        let got: Option<Payload> = cache.read_fresh("k", Duration::ZERO);

        assert_eq!(got, None);
    }

    #[test]
    fn missing_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        let got: Option<Payload> =
            cache.read_fresh("nothing", Duration::from_secs(60));
        assert_eq!(got, None);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        fs::write(cache.entry_path("bad"), "{not json").unwrap();
        let got: Option<Payload> =
            cache.read_fresh("bad", Duration::from_secs(60));
        assert_eq!(got, None);
    }

    #[test]
    fn entry_file_shape_is_stable() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        cache.write("k", &Payload { price: 2.0 }).unwrap();
        let raw = fs::read_to_string(cache.entry_path("k")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert!(value.get("timestamp").and_then(|v| v.as_i64()).is_some());
        assert_eq!(value.get("price").and_then(|v| v.as_f64()), Some(2.0));
    }
}
