//! Session-scoped check result cache.

use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::check::CheckKind;
use crate::config::CacheConfig;
use crate::observability::metrics;

/// Caller-supplied credential scoping cache entries to one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SessionNonce(String);

impl SessionNonce {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty nonce disables caching for the request.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cache key for `kind` under this nonce (`"<nonce>:<kind>"`).
    pub fn cache_key(&self, kind: CheckKind) -> String {
        format!("{}:{}", self.0, kind)
    }
}

impl fmt::Display for SessionNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Concurrent, expiring map from `(nonce, kind)` to a result fragment.
///
/// Cloning is cheap; every clone shares the same entries.
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl SessionCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live fragment.
    pub fn get(&self, nonce: &SessionNonce, kind: CheckKind) -> Option<Bytes> {
        if nonce.is_empty() {
            return None;
        }
        let key = nonce.cache_key(kind);
        let hit = match self.inner.get(&key) {
            Some(entry) if entry.is_live(Instant::now()) => Some(entry.value.clone()),
            Some(entry) => {
                drop(entry);
                if self
                    .inner
                    .remove_if(&key, |_, e| !e.is_live(Instant::now()))
                    .is_some()
                {
                    metrics::record_cache_size(self.inner.len());
                }
                None
            }
            None => None,
        };
        metrics::record_cache_lookup(kind.as_str(), hit.is_some());
        hit
    }

    /// Store or refresh a fragment. Last write wins.
    pub fn put(&self, nonce: &SessionNonce, kind: CheckKind, value: Bytes) {
        if nonce.is_empty() {
            tracing::debug!(check = %kind, "No session nonce, skipping cache write");
            return;
        }
        self.inner.insert(
            nonce.cache_key(kind),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    /// Drop expired entries, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.inner.len();
        let now = Instant::now();
        self.inner.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_size(self.inner.len());
        removed
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Run [`sweep`](Self::sweep) every `interval` until shutdown.
    pub fn spawn_sweeper(
        &self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, remaining = cache.len(), "Swept expired cache entries");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::metrics::{
        Counter, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::Mutex;

    #[test]
    fn test_put_then_get() {
        let cache = SessionCache::new(Duration::from_secs(300));
        let nonce = SessionNonce::new("abc");

        assert!(cache.get(&nonce, CheckKind::Config).is_none());

        cache.put(&nonce, CheckKind::Config, Bytes::from_static(b"{\"title\":\"x\"}"));
        assert_eq!(
            cache.get(&nonce, CheckKind::Config).unwrap(),
            Bytes::from_static(b"{\"title\":\"x\"}")
        );
        // Scoped by kind and nonce
        assert!(cache.get(&nonce, CheckKind::User).is_none());
        assert!(cache.get(&SessionNonce::new("other"), CheckKind::Config).is_none());
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let cache = SessionCache::new(Duration::from_secs(300));
        let nonce = SessionNonce::new("abc");
        cache.put(&nonce, CheckKind::User, Bytes::from_static(b"[1]"));
        cache.put(&nonce, CheckKind::User, Bytes::from_static(b"[2]"));
        assert_eq!(cache.get(&nonce, CheckKind::User).unwrap(), Bytes::from_static(b"[2]"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_nonce_disables_caching() {
        let cache = SessionCache::new(Duration::from_secs(300));
        let nonce = SessionNonce::default();
        cache.put(&nonce, CheckKind::Plugin, Bytes::from_static(b"[]"));
        assert!(cache.is_empty());
        assert!(cache.get(&nonce, CheckKind::Plugin).is_none());
    }

    #[test]
    fn test_entries_expire() {
        let cache = SessionCache::new(Duration::from_millis(20));
        let nonce = SessionNonce::new("abc");
        cache.put(&nonce, CheckKind::Config, Bytes::from_static(b"x"));
        assert!(cache.get(&nonce, CheckKind::Config).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&nonce, CheckKind::Config).is_none());
        // Expired entry removed on read
        assert!(cache.is_empty());
    }

    /// Keeps the last value written to any gauge.
    #[derive(Default)]
    struct LastGauge(Mutex<Option<f64>>);

    impl GaugeFn for LastGauge {
        fn increment(&self, value: f64) {
            let mut last = self.0.lock().unwrap();
            *last = Some(last.unwrap_or(0.0) + value);
        }

        fn decrement(&self, value: f64) {
            let mut last = self.0.lock().unwrap();
            *last = Some(last.unwrap_or(0.0) - value);
        }

        fn set(&self, value: f64) {
            *self.0.lock().unwrap() = Some(value);
        }
    }

    struct GaugeCapture(Arc<LastGauge>);

    impl Recorder for GaugeCapture {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::from_arc(self.0.clone())
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_expired_read_updates_size_gauge() {
        let cache = SessionCache::new(Duration::from_millis(20));
        let nonce = SessionNonce::new("abc");
        cache.put(&nonce, CheckKind::Config, Bytes::from_static(b"x"));
        std::thread::sleep(Duration::from_millis(40));

        let gauge = Arc::new(LastGauge::default());
        let recorder = GaugeCapture(gauge.clone());
        ::metrics::with_local_recorder(&recorder, || {
            assert!(cache.get(&nonce, CheckKind::Config).is_none());
        });
        assert_eq!(*gauge.0.lock().unwrap(), Some(0.0));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = SessionCache::new(Duration::from_millis(20));
        let nonce = SessionNonce::new("abc");
        cache.put(&nonce, CheckKind::Plugin, Bytes::from_static(b"[]"));
        std::thread::sleep(Duration::from_millis(40));
        cache.put(&nonce, CheckKind::User, Bytes::from_static(b"[]"));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&nonce, CheckKind::User).is_some());
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(SessionNonce::new("n1").cache_key(CheckKind::Config), "n1:config");
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let cache = SessionCache::new(Duration::from_millis(10));
        let (tx, rx) = broadcast::channel(1);
        let handle = cache.spawn_sweeper(Duration::from_millis(5), rx);

        cache.put(&SessionNonce::new("abc"), CheckKind::User, Bytes::from_static(b"[]"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty());

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache = SessionCache::new(Duration::from_secs(300));
        let mut tasks = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                let nonce = SessionNonce::new(format!("n{}", i));
                cache.put(&nonce, CheckKind::User, Bytes::from(format!("[{}]", i)));
                cache.get(&nonce, CheckKind::User)
            }));
        }
        for (i, task) in tasks.into_iter().enumerate() {
            let value = task.await.unwrap().unwrap();
            assert_eq!(value, Bytes::from(format!("[{}]", i)));
        }
        assert_eq!(cache.len(), 16);
    }
}
