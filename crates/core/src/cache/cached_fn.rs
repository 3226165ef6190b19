//! Refresh-cached values with stale-while-revalidate.
//!
//! A [`CachedFunction`] wraps an async producer and persists its output in a
//! [`CacheDb`] namespace. Reads are classified by the age of the stored entry:
//!
//! - age <= `max_age`: served from cache, no producer call
//! - age <= `max_age + stale_while_revalidate`: served from cache while a
//!   background task refreshes the entry; refresh failures are logged and dropped
//! - older, or absent: the caller waits on the producer; failures propagate and
//!   leave any previous entry in place
//!
//! Concurrent misses on the same key may both call the producer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::task::JoinHandle;

use super::connection::CacheDb;
use crate::Error;

/// Boxed future returned by an updater.
pub type UpdateFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'static>>;

type Updater<A, T> = Arc<dyn Fn(A) -> UpdateFuture<T> + Send + Sync>;
type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

/// Arguments accepted by a cached function.
///
/// The default cache key of an argument is its string form; `()` maps to
/// the empty key.
pub trait CacheArg: Clone + Send + Sync + 'static {
    fn cache_key(&self) -> String;
}

impl CacheArg for () {
    fn cache_key(&self) -> String {
        String::new()
    }
}

impl CacheArg for String {
    fn cache_key(&self) -> String {
        self.clone()
    }
}

/// Freshness window and staleness tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub max_age: Duration,
    pub stale_while_revalidate: Duration,
}

/// Classification of a stored entry by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
    Expired,
}

impl RefreshPolicy {
    pub fn new(max_age: Duration, stale_while_revalidate: Duration) -> Self {
        Self { max_age, stale_while_revalidate }
    }

    /// Both bounds are inclusive.
    pub fn classify(&self, age: Duration) -> Freshness {
        if age <= self.max_age {
            Freshness::Fresh
        } else if age <= self.max_age.saturating_add(self.stale_while_revalidate) {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}

/// A decoded cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Age relative to `now`. Timestamps in the future count as zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// How a value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    /// Served from a fresh entry.
    Hit,
    /// Served from a stale entry; a background refresh was scheduled.
    StaleHit,
    /// Produced by the updater while the caller waited.
    Miss,
}

/// A value together with how it was obtained.
#[derive(Debug)]
pub struct Cached<T> {
    pub value: T,
    pub lookup: Lookup,
    pub fetched_at: DateTime<Utc>,
    /// Background refresh scheduled by a stale hit. Dropping it detaches the task.
    pub refresh: Option<JoinHandle<()>>,
}

/// An async function whose results are persisted and refreshed by age.
pub struct CachedFunction<A, T> {
    name: Arc<str>,
    db: CacheDb,
    policy: RefreshPolicy,
    updater: Updater<A, T>,
    cache_key: KeyFn<A>,
}

impl<A, T> Clone for CachedFunction<A, T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            db: self.db.clone(),
            policy: self.policy,
            updater: Arc::clone(&self.updater),
            cache_key: Arc::clone(&self.cache_key),
        }
    }
}

impl<A, T> std::fmt::Debug for CachedFunction<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFunction")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<A, T> CachedFunction<A, T>
where
    A: CacheArg,
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Create a cached function storing into namespace `name`.
    pub fn new<F, Fut>(name: impl Into<String>, db: CacheDb, policy: RefreshPolicy, updater: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let name: String = name.into();
        Self {
            name: name.into(),
            db,
            policy,
            updater: Arc::new(move |arg: A| Box::pin(updater(arg)) as UpdateFuture<T>),
            cache_key: Arc::new(|arg: &A| arg.cache_key()),
        }
    }

    /// Replace the key derivation, which defaults to [`CacheArg::cache_key`].
    pub fn with_cache_key<K>(mut self, cache_key: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.cache_key = Arc::new(cache_key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Get the value for `arg`, producing it if needed.
    pub async fn get(&self, arg: A) -> Result<T, Error> {
        self.get_with_status(arg).await.map(|cached| cached.value)
    }

    /// Get the value for `arg` along with how it was obtained.
    pub async fn get_with_status(&self, arg: A) -> Result<Cached<T>, Error> {
        let key = (self.cache_key)(&arg);

        if let Some(entry) = self.read(&key).await? {
            match self.policy.classify(entry.age(Utc::now())) {
                Freshness::Fresh => {
                    tracing::debug!(namespace = %self.name, key = %key, "cache hit");
                    return Ok(Cached {
                        value: entry.value,
                        lookup: Lookup::Hit,
                        fetched_at: entry.fetched_at,
                        refresh: None,
                    });
                }
                Freshness::Stale => {
                    tracing::debug!(namespace = %self.name, key = %key, "stale cache hit, refreshing in background");
                    let refresh = self.spawn_refresh(arg, key);
                    return Ok(Cached {
                        value: entry.value,
                        lookup: Lookup::StaleHit,
                        fetched_at: entry.fetched_at,
                        refresh: Some(refresh),
                    });
                }
                Freshness::Expired => {
                    tracing::debug!(namespace = %self.name, key = %key, "cache entry expired");
                }
            }
        }

        let entry = self.update(arg, &key).await?;
        Ok(Cached { value: entry.value, lookup: Lookup::Miss, fetched_at: entry.fetched_at, refresh: None })
    }

    /// Read the stored value for `arg` without calling the updater.
    ///
    /// Expired entries are reported as absent.
    pub async fn get_cached(&self, arg: &A) -> Result<Option<T>, Error> {
        let key = (self.cache_key)(arg);
        let entry = self.read(&key).await?;
        Ok(entry
            .filter(|entry| self.policy.classify(entry.age(Utc::now())) != Freshness::Expired)
            .map(|entry| entry.value))
    }

    /// Call the updater and store its result regardless of cache state.
    pub async fn get_fresh(&self, arg: A) -> Result<T, Error> {
        let key = (self.cache_key)(&arg);
        self.update(arg, &key).await.map(|entry| entry.value)
    }

    /// Remove the stored value for `arg`.
    pub async fn delete(&self, arg: &A) -> Result<bool, Error> {
        let key = (self.cache_key)(arg);
        self.db.delete_entry(&self.name, &key).await
    }

    /// Remove every stored value in this function's namespace.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.db.clear_namespace(&self.name).await
    }

    async fn read(&self, key: &str) -> Result<Option<CacheEntry<T>>, Error> {
        let Some(stored) = self.db.get_entry(&self.name, key).await? else {
            return Ok(None);
        };

        let fetched_at = match stored.fetched_at() {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!(namespace = %self.name, key = %key, error = %e, "ignoring cache entry");
                return Ok(None);
            }
        };

        match serde_json::from_str(&stored.value_json) {
            Ok(value) => Ok(Some(CacheEntry { value, fetched_at })),
            Err(e) => {
                tracing::warn!(namespace = %self.name, key = %key, error = %e, "ignoring undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Run the updater and persist the result.
    ///
    /// A value that was produced but could not be stored is still returned.
    async fn update(&self, arg: A, key: &str) -> Result<CacheEntry<T>, Error> {
        let value = (self.updater)(arg).await?;
        let fetched_at = Utc::now();

        let value_json = serde_json::to_string(&value).map_err(|e| Error::Encode(e.to_string()))?;
        match self.db.put_entry(&self.name, key, &value_json, fetched_at).await {
            Ok(changed) => {
                tracing::info!(namespace = %self.name, key = %key, changed, "cache entry updated");
            }
            Err(e) => {
                tracing::warn!(namespace = %self.name, key = %key, error = %e, "failed to store cache entry");
            }
        }

        Ok(CacheEntry { value, fetched_at })
    }

    fn spawn_refresh(&self, arg: A, key: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.update(arg, &key).await {
                tracing::warn!(namespace = %this.name, key = %key, error = %e, "background refresh failed");
            }
        })
    }
}
