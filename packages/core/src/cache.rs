//! File-backed TTL cache for node responses.
//!
//! One JSON file per chain maps cache keys to `{timestamp, data}` entries.
//! Entries are only ever replaced by a newer successful fetch; a failed
//! fetch leaves the previous entry in place.
//!
//! Reads take no lock because the file is only ever swapped in by rename.
//! Writes re-read the file under an async mutex, upsert one key, write a
//! uniquely named sibling temp file and rename it over the store. The
//! mutex is per path and shared by every store in the process, so two
//! stores on one file never interleave. Two *processes* sharing a cache
//! directory can still race; the later rename wins.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, OnceLock, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::chain::Chain;
use crate::error::{AppError, RpcError};

/// TTL applied to any method without an override.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Per-method time-to-live, in seconds.
///
/// TTLs are keyed by method only: two calls to the same method with
/// different params live under different cache keys but share a TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    default_seconds: u64,
    overrides: HashMap<String, u64>,
}

impl TtlPolicy {
    pub fn new(default_seconds: u64) -> Self {
        Self {
            default_seconds,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, method: impl Into<String>, seconds: u64) -> Self {
        self.overrides.insert(method.into(), seconds);
        self
    }

    pub fn ttl_for(&self, method: &str) -> u64 {
        self.overrides
            .get(method)
            .copied()
            .unwrap_or(self.default_seconds)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS)
    }
}

/// One persisted response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fetch time, epoch seconds.
    pub timestamp: i64,
    pub data: Value,
}

/// On-disk shape of a store.
pub type CacheMap = BTreeMap<String, CacheEntry>;

/// Whether a value came from disk or from a fresh fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Refreshed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub payload: Value,
    pub status: CacheStatus,
}

/// Cache key for a call: method name plus a SHA-256 of the params.
///
/// serde_json sorts object keys (no `preserve_order`), so equal params
/// always hash the same regardless of how they were built.
pub fn cache_key(method: &str, params: &[Value]) -> String {
    let canonical = Value::Array(params.to_vec()).to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{}_{}", method, hex::encode(digest))
}

/// Write lock for `path`, shared by every store on that file.
fn write_lock_for(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks.entry(path.to_path_buf()).or_default().clone()
}

/// Per-chain response store.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let write_lock = write_lock_for(&path);
        Self { path, write_lock }
    }

    /// Store for `chain` inside `dir`, e.g. `dir/btc_cache.json`.
    pub fn for_chain(dir: impl AsRef<Path>, chain: Chain) -> Self {
        Self::new(dir.as_ref().join(format!("{}_cache.json", chain.identifier())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. Missing or unparsable files read as empty.
    pub async fn load(&self) -> CacheMap {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return CacheMap::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "cache store unreadable, treating as empty");
                return CacheMap::new();
            }
        };

        match serde_json::from_slice::<CacheMap>(&bytes) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "cache store corrupt, treating as empty");
                CacheMap::new()
            }
        }
    }

    /// Returns the stored payload for `key` when younger than `ttl_seconds`.
    pub async fn lookup(&self, key: &str, ttl_seconds: u64, now: i64) -> Option<Value> {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        self.load()
            .await
            .remove(key)
            .filter(|entry| now.saturating_sub(entry.timestamp) < ttl)
            .map(|entry| entry.data)
    }

    /// Insert or replace one entry and persist the store atomically.
    pub async fn upsert(&self, key: String, entry: CacheEntry) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await;
        map.insert(key, entry);
        self.persist(&map).await
    }

    async fn persist(&self, map: &CacheMap) -> Result<(), AppError> {
        let body = serde_json::to_vec(map)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || replace_file(&path, &body))
            .await
            .map_err(|err| AppError::Cache(io::Error::new(ErrorKind::Other, err)))??;
        Ok(())
    }

    /// Serve `method(params)` from the store, or call `fetch` on a miss.
    ///
    /// A successful fetch is persisted before returning. A failed fetch is
    /// returned as-is and the store is left untouched.
    pub async fn get<F, Fut>(
        &self,
        method: &str,
        params: &[Value],
        policy: &TtlPolicy,
        fetch: F,
    ) -> Result<CachedValue, RpcError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, RpcError>>,
    {
        let key = cache_key(method, params);
        let ttl = policy.ttl_for(method);

        if let Some(payload) = self.lookup(&key, ttl, Utc::now().timestamp()).await {
            tracing::debug!(method, ttl, "cache hit");
            return Ok(CachedValue {
                payload,
                status: CacheStatus::Hit,
            });
        }

        tracing::debug!(method, ttl, "cache miss, fetching from node");
        let payload = fetch().await?;

        let entry = CacheEntry {
            timestamp: Utc::now().timestamp(),
            data: payload.clone(),
        };
        if let Err(err) = self.upsert(key, entry).await {
            tracing::warn!(method, error = %err, "failed to persist cache entry");
        }

        Ok(CachedValue {
            payload,
            status: CacheStatus::Refreshed,
        })
    }
}

/// Write `body` to a fresh temp file beside `path`, then rename it over `path`.
fn replace_file(path: &Path, body: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CacheStore {
        CacheStore::for_chain(dir.path(), Chain::Bitcoin)
    }

    fn read_raw(store: &CacheStore) -> Value {
        let raw = std::fs::read_to_string(store.path()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    async fn seed(store: &CacheStore, method: &str, params: &[Value], age_secs: i64, data: Value) {
        let entry = CacheEntry {
            timestamp: Utc::now().timestamp() - age_secs,
            data,
        };
        store.upsert(cache_key(method, params), entry).await.unwrap();
    }

    // ---- TtlPolicy ----

    #[test]
    fn ttl_falls_back_to_default() {
        let policy = TtlPolicy::new(300).with_override("getmempoolinfo", 20);
        assert_eq!(policy.ttl_for("getmempoolinfo"), 20);
        assert_eq!(policy.ttl_for("getnetworkinfo"), 300);
        assert_eq!(TtlPolicy::default().ttl_for("anything"), DEFAULT_TTL_SECONDS);
    }

    // ---- cache_key ----

    #[test]
    fn cache_key_is_stable_and_param_sensitive() {
        let a = cache_key("estimatesmartfee", &[json!(1)]);
        let b = cache_key("estimatesmartfee", &[json!(1)]);
        let c = cache_key("estimatesmartfee", &[json!(6)]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("estimatesmartfee_"));
        assert_eq!(a.len(), "estimatesmartfee_".len() + 64);
    }

    #[test]
    fn cache_key_ignores_object_key_order() {
        let mut forward = serde_json::Map::new();
        forward.insert("a".into(), json!(1));
        forward.insert("b".into(), json!(2));
        let mut reverse = serde_json::Map::new();
        reverse.insert("b".into(), json!(2));
        reverse.insert("a".into(), json!(1));

        assert_eq!(
            cache_key("get_block", &[Value::Object(forward)]),
            cache_key("get_block", &[Value::Object(reverse)])
        );
    }

    // ---- get ----

    #[tokio::test]
    async fn miss_fetches_and_persists_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let value = store
            .get("getblockchaininfo", &[], &TtlPolicy::default(), || async {
                Ok(json!({"blocks": 850_000}))
            })
            .await
            .unwrap();

        assert_eq!(value.status, CacheStatus::Refreshed);
        assert_eq!(value.payload, json!({"blocks": 850_000}));

        let raw = read_raw(&store);
        let entry = &raw[cache_key("getblockchaininfo", &[])];
        assert_eq!(entry["data"], json!({"blocks": 850_000}));
        assert!(entry["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn hit_within_ttl_skips_fetch() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let calls = AtomicUsize::new(0);
        let policy = TtlPolicy::default();

        for _ in 0..2 {
            store
                .get("getmempoolinfo", &[], &policy, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"size": 12}))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_override_refetches_every_time() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let calls = AtomicUsize::new(0);
        let policy = TtlPolicy::default().with_override("getmempoolinfo", 0);

        for _ in 0..3 {
            store
                .get("getmempoolinfo", &[], &policy, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"size": 12}))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn expiry_follows_method_override() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "getnetworkinfo", &[], 100, json!({"connections": 8})).await;

        // 100s old entry is fresh under the default 300s TTL.
        let value = store
            .get("getnetworkinfo", &[], &TtlPolicy::new(300), || async {
                Ok(json!({"connections": 10}))
            })
            .await
            .unwrap();
        assert_eq!(value.status, CacheStatus::Hit);
        assert_eq!(value.payload, json!({"connections": 8}));

        // ... and stale once the override drops below its age.
        let policy = TtlPolicy::new(300).with_override("getnetworkinfo", 90);
        let value = store
            .get("getnetworkinfo", &[], &policy, || async {
                Ok(json!({"connections": 10}))
            })
            .await
            .unwrap();
        assert_eq!(value.status, CacheStatus::Refreshed);
        assert_eq!(value.payload, json!({"connections": 10}));
    }

    #[tokio::test]
    async fn ttl_is_shared_across_params_of_one_method() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "estimatesmartfee", &[json!(1)], 200, json!({"feerate": 0.0002})).await;
        seed(&store, "estimatesmartfee", &[json!(144)], 200, json!({"feerate": 0.00001})).await;

        let policy = TtlPolicy::new(300).with_override("estimatesmartfee", 120);
        for target in [1, 144] {
            let value = store
                .get("estimatesmartfee", &[json!(target)], &policy, || async {
                    Ok(json!({"feerate": 0.0005}))
                })
                .await
                .unwrap();
            assert_eq!(value.status, CacheStatus::Refreshed);
        }
    }

    #[tokio::test]
    async fn failed_fetch_keeps_stale_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "getmininginfo", &[], 1_000, json!({"networkhashps": 1.0})).await;
        let before = read_raw(&store);

        let result = store
            .get("getmininginfo", &[], &TtlPolicy::default(), || async {
                Err(RpcError::transport("getmininginfo", "connection refused"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(read_raw(&store), before);
    }

    #[tokio::test]
    async fn failed_fetch_on_empty_store_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result = store
            .get("getmininginfo", &[], &TtlPolicy::default(), || async {
                Err(RpcError::transport("getmininginfo", "timed out"))
            })
            .await;

        assert!(result.is_err());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_store_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ this is not json").unwrap();

        let calls = AtomicUsize::new(0);
        store
            .get("getchaintxstats", &[], &TtlPolicy::default(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"txcount": 1_000_000}))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let raw = read_raw(&store);
        let map = raw.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&cache_key("getchaintxstats", &[])));
    }

    #[tokio::test]
    async fn stores_sharing_a_file_keep_every_write() {
        let dir = TempDir::new().unwrap();
        let first = store_in(&dir);
        let second = store_in(&dir);

        let writes = (0..200).map(|idx| {
            let store = if idx % 2 == 0 { &first } else { &second };
            let entry = CacheEntry {
                timestamp: Utc::now().timestamp(),
                data: json!({"idx": idx}),
            };
            store.upsert(format!("getblockhash_{}", idx), entry)
        });
        let results = futures_util::future::join_all(writes).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(first.load().await.len(), 200);
        assert_eq!(second.load().await, first.load().await);

        // Temp files are renamed away, only the store remains.
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn wrong_shape_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn persisted_store_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "getblockchaininfo", &[], 0, json!({"chain": "main", "blocks": 1})).await;
        seed(&store, "estimatesmartfee", &[json!(6)], 5, json!({"feerate": 0.0001, "blocks": 6})).await;

        let first = store.load().await;
        let reopened = CacheStore::for_chain(dir.path(), Chain::Bitcoin).load().await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, reopened);
    }

    #[tokio::test]
    async fn stores_are_separate_per_chain() {
        let dir = TempDir::new().unwrap();
        let btc = CacheStore::for_chain(dir.path(), Chain::Bitcoin);
        let xmr = CacheStore::for_chain(dir.path(), Chain::Monero);
        seed(&btc, "getblockchaininfo", &[], 0, json!({})).await;

        assert!(btc.path().ends_with("btc_cache.json"));
        assert!(xmr.path().ends_with("xmr_cache.json"));
        assert!(xmr.load().await.is_empty());
    }
}
