//! The cache synchronizer
//!
//! Owns the three cache partitions and reconciles them against the
//! embedded resource manifest across the worker lifecycle: install
//! stages fresh shell files, activate diffs the persisted manifest
//! record and promotes staging, fetch interception serves manifest
//! resources online-first (root) or cache-first (everything else).

use crate::error::{SyncError, SyncResult};
use crate::manifest::{ResourceManifest, ROOT_ALIAS};
use crate::net::{FetchMode, ResourceFetcher};
use crate::store::{CachedResource, CacheStore};
use crate::sync::key;
use async_trait::async_trait;
use futures_util::future;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Key of the single synthetic entry in the manifest record partition
pub const MANIFEST_RECORD_KEY: &str = "manifest";

/// Names of the three cache partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    /// Shell files fetched during install, promoted on activate
    pub staging: String,
    /// Durable partition served to clients
    pub content: String,
    /// Holds the single persisted manifest record
    pub manifest: String,
}

impl Default for PartitionNames {
    fn default() -> Self {
        Self {
            staging: "shell-staging".to_string(),
            content: "shell-content".to_string(),
            manifest: "shell-manifest".to_string(),
        }
    }
}

/// Immutable configuration injected at construction
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Origin all manifest resources resolve against, no trailing slash
    pub origin: String,
    /// Core shell set: paths that must be staged before the worker
    /// counts as installed, in fetch order
    pub shell: Vec<String>,
    /// Partition names
    pub partitions: PartitionNames,
}

impl SyncConfig {
    /// Create a config for an origin with the default partition names
    pub fn new(origin: impl Into<String>, shell: Vec<String>) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self {
            origin,
            shell,
            partitions: PartitionNames::default(),
        }
    }
}

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method, verbatim
    pub method: String,
    /// Absolute request URL
    pub url: String,
}

impl Request {
    /// Convenience constructor for a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }
}

/// Outcome of fetch interception
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not a manifest resource; the host's network stack handles it
    Passthrough,
    /// Response produced by the synchronizer
    Response(CachedResource),
}

/// Inbound control messages from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Activate the installing worker immediately
    SkipWaiting,
    /// Fetch every manifest resource not yet cached
    DownloadOffline,
}

impl ControlMessage {
    /// Parse the literal wire values; anything else is ignored
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }
}

/// Host-runtime callbacks the protocol needs
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Let the installing worker supersede the active one immediately
    fn skip_waiting(&self);

    /// Take control of all open clients after activation
    async fn claim_clients(&self);
}

/// Host control for embeddings without client lifecycle (the CLI)
#[derive(Default)]
pub struct NullHost;

#[async_trait]
impl HostControl for NullHost {
    fn skip_waiting(&self) {}

    async fn claim_clients(&self) {}
}

/// Reconciles the cache partitions against the embedded manifest
pub struct CacheSynchronizer {
    manifest: ResourceManifest,
    config: SyncConfig,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn ResourceFetcher>,
    host: Arc<dyn HostControl>,
}

impl CacheSynchronizer {
    /// Create a synchronizer over the given backends
    pub fn new(
        manifest: ResourceManifest,
        config: SyncConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn ResourceFetcher>,
        host: Arc<dyn HostControl>,
    ) -> Self {
        Self {
            manifest,
            config,
            store,
            fetcher,
            host,
        }
    }

    /// The embedded resource manifest
    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    /// The core shell set
    pub fn shell(&self) -> &[String] {
        &self.config.shell
    }

    /// Absolute URL a logical key resolves to
    fn request_url(&self, logical: &str) -> String {
        if logical == ROOT_ALIAS {
            format!("{}/", self.config.origin)
        } else {
            format!("{}/{}", self.config.origin, logical)
        }
    }

    /// Install phase: stage every core shell resource.
    ///
    /// Signals readiness to supersede the active worker first, then
    /// fetches each shell file bypassing HTTP caches. A fetch or store
    /// failure fails the install.
    pub async fn install(&self) -> SyncResult<()> {
        self.host.skip_waiting();

        for path in &self.config.shell {
            let url = self.request_url(path);
            let resource = self.fetcher.fetch(&url, FetchMode::NoCache).await?;
            if !resource.is_success() {
                return Err(SyncError::fetch(&url, format!("HTTP {}", resource.status)));
            }
            self.store
                .put(&self.config.partitions.staging, &url, resource)
                .await?;
        }

        info!(resources = self.config.shell.len(), "install complete, shell staged");
        Ok(())
    }

    /// Activate phase: reconcile content against the manifest record.
    ///
    /// Any unexpected failure leaves the cache state unreliable, so all
    /// three partitions are discarded and the error is reported without
    /// propagating; the next load rebuilds from the network.
    pub async fn activate(&self) -> SyncResult<()> {
        if let Err(err) = self.try_activate().await {
            error!(error = %err, "activation failed, invalidating all cache partitions");
            self.invalidate_all().await;
        }
        Ok(())
    }

    async fn try_activate(&self) -> SyncResult<()> {
        let names = &self.config.partitions;
        let record = self.store.get(&names.manifest, MANIFEST_RECORD_KEY).await?;

        match record {
            None => {
                // First install (or post-invalidation): nothing in the
                // content partition can be trusted.
                self.store.drop_partition(&names.content).await?;
                self.promote_staging().await?;
                info!("activated with a clean content partition");
            }
            Some(entry) => {
                let raw = entry
                    .body_str()
                    .ok_or_else(|| SyncError::store("manifest record is not UTF-8"))?;
                let prior = ResourceManifest::from_json(raw)?;
                let mut dropped = 0usize;

                for url in self.store.keys(&names.content).await? {
                    let logical = key::stored_key(&url, &self.config.origin);
                    if !self.manifest.retains(&logical, &prior) {
                        self.store.delete(&names.content, &url).await?;
                        dropped += 1;
                    }
                }

                self.promote_staging().await?;
                info!(dropped, "activated, stale content reconciled");
            }
        }

        let record = CachedResource::json(self.manifest.to_json()?);
        self.store
            .put(&self.config.partitions.manifest, MANIFEST_RECORD_KEY, record)
            .await?;
        self.host.claim_clients().await;
        Ok(())
    }

    /// Copy every staging entry into content (shell files always win),
    /// then discard staging.
    async fn promote_staging(&self) -> SyncResult<()> {
        let names = &self.config.partitions;
        for url in self.store.keys(&names.staging).await? {
            if let Some(resource) = self.store.get(&names.staging, &url).await? {
                self.store.put(&names.content, &url, resource).await?;
            }
        }
        self.store.drop_partition(&names.staging).await
    }

    async fn invalidate_all(&self) {
        let names = &self.config.partitions;
        for partition in [&names.content, &names.staging, &names.manifest] {
            if let Err(err) = self.store.drop_partition(partition).await {
                error!(partition = %partition, error = %err, "failed to drop partition");
            }
        }
    }

    /// Fetch interception.
    ///
    /// Only GETs for manifest resources are intercepted; everything else
    /// passes through to the host's network stack. The root document is
    /// served online-first, all other resources cache-first.
    pub async fn handle_fetch(&self, request: &Request) -> SyncResult<FetchOutcome> {
        if request.method != "GET" {
            return Ok(FetchOutcome::Passthrough);
        }

        let Some(logical) = key::logical_key(&request.url, &self.config.origin) else {
            return Ok(FetchOutcome::Passthrough);
        };
        if !self.manifest.contains(&logical) {
            debug!(url = %request.url, key = %logical, "not a manifest resource, passing through");
            return Ok(FetchOutcome::Passthrough);
        }

        let response = if logical == ROOT_ALIAS {
            self.online_first(request).await?
        } else {
            self.cache_first(request).await?
        };
        Ok(FetchOutcome::Response(response))
    }

    /// Online-first: live fetch, cache on success, fall back to the
    /// cached copy on network failure, propagate when there is none.
    async fn online_first(&self, request: &Request) -> SyncResult<CachedResource> {
        let content = &self.config.partitions.content;
        match self.fetcher.fetch(&request.url, FetchMode::Default).await {
            Ok(response) => {
                self.store
                    .put(content, &request.url, response.clone())
                    .await?;
                Ok(response)
            }
            Err(err) => match self.store.get(content, &request.url).await? {
                Some(cached) => {
                    debug!(url = %request.url, "network down, serving cached root");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    /// Cache-first: serve the cached entry when present; otherwise fetch,
    /// caching only successful responses. Failed responses are returned
    /// to the caller unmodified, never masked.
    async fn cache_first(&self, request: &Request) -> SyncResult<CachedResource> {
        let content = &self.config.partitions.content;
        if let Some(cached) = self.store.get(content, &request.url).await? {
            return Ok(cached);
        }

        let response = self.fetcher.fetch(&request.url, FetchMode::Default).await?;
        if response.is_success() {
            self.store
                .put(content, &request.url, response.clone())
                .await?;
        }
        Ok(response)
    }

    /// Fetch and cache every manifest resource not already present.
    ///
    /// Present keys are derived with `stored_key`, which does not strip
    /// the `?v=` suffix; an entry cached under a cache-busted URL does
    /// not count as present. Returns the number of resources downloaded.
    pub async fn download_offline(&self) -> SyncResult<usize> {
        let names = &self.config.partitions;
        let mut present = std::collections::HashSet::new();
        for url in self.store.keys(&names.content).await? {
            present.insert(key::stored_key(&url, &self.config.origin));
        }

        let missing: Vec<&str> = self
            .manifest
            .keys()
            .filter(|k| !present.contains(*k))
            .collect();

        let fetched = future::try_join_all(missing.iter().map(|logical| {
            let url = self.request_url(logical);
            async move {
                let resource = self.fetcher.fetch(&url, FetchMode::Default).await?;
                if !resource.is_success() {
                    return Err(SyncError::fetch(&url, format!("HTTP {}", resource.status)));
                }
                Ok((url, resource))
            }
        }))
        .await?;

        for (url, resource) in fetched {
            self.store.put(&names.content, &url, resource).await?;
        }

        info!(downloaded = missing.len(), "offline download complete");
        Ok(missing.len())
    }

    /// Handle an inbound control message; unknown messages are ignored
    pub async fn handle_message(&self, raw: &str) -> SyncResult<()> {
        match ControlMessage::parse(raw) {
            Some(ControlMessage::SkipWaiting) => {
                self.host.skip_waiting();
                Ok(())
            }
            Some(ControlMessage::DownloadOffline) => self.download_offline().await.map(|_| ()),
            None => {
                debug!(message = raw, "ignoring unknown control message");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ORIGIN: &str = "https://app.example";

    fn manifest(pairs: &[(&str, &str)]) -> ResourceManifest {
        let entries: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResourceManifest::from_entries(entries).unwrap()
    }

    fn resource(body: &str, status: u16) -> CachedResource {
        CachedResource::new(body.as_bytes().to_vec(), status, None)
    }

    #[derive(Default)]
    struct ScriptedFetcher {
        responses: Mutex<HashMap<String, CachedResource>>,
        failures: Mutex<HashSet<String>>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn ok(&self, url: &str, body: &str) {
            self.status(url, 200, body);
        }

        fn status(&self, url: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), resource(body, status));
        }

        fn fail(&self, url: &str) {
            self.failures.lock().unwrap().insert(url.to_string());
        }

        fn fetched(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _mode: FetchMode) -> SyncResult<CachedResource> {
            self.log.lock().unwrap().push(url.to_string());
            if self.failures.lock().unwrap().contains(url) {
                return Err(SyncError::fetch(url, "network unreachable"));
            }
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| SyncError::fetch(url, "no scripted response"))
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        skip_waiting_calls: AtomicUsize,
        claim_calls: AtomicUsize,
    }

    #[async_trait]
    impl HostControl for RecordingHost {
        fn skip_waiting(&self) {
            self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
        }

        async fn claim_clients(&self) {
            self.claim_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        fetcher: Arc<ScriptedFetcher>,
        host: Arc<RecordingHost>,
        sync: CacheSynchronizer,
        names: PartitionNames,
    }

    fn fixture(m: ResourceManifest, shell: &[&str]) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let fetcher = Arc::new(ScriptedFetcher::default());
        let host = Arc::new(RecordingHost::default());
        let config = SyncConfig::new(ORIGIN, shell.iter().map(|s| s.to_string()).collect());
        let names = config.partitions.clone();
        let sync = CacheSynchronizer::new(
            m,
            config,
            store.clone(),
            fetcher.clone(),
            host.clone(),
        );
        Fixture {
            store,
            fetcher,
            host,
            sync,
            names,
        }
    }

    fn url(path: &str) -> String {
        format!("{ORIGIN}/{path}")
    }

    #[tokio::test]
    async fn install_stages_every_shell_resource() {
        let f = fixture(
            manifest(&[("index.html", "h1"), ("main.js", "h2")]),
            &["index.html", "main.js"],
        );
        f.fetcher.ok(&url("index.html"), "<html>");
        f.fetcher.ok(&url("main.js"), "js");

        f.sync.install().await.unwrap();

        let staged = f.store.keys(&f.names.staging).await.unwrap();
        assert_eq!(staged, vec![url("index.html"), url("main.js")]);
        assert_eq!(f.host.skip_waiting_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn install_fails_on_http_error() {
        let f = fixture(manifest(&[("index.html", "h1")]), &["index.html"]);
        f.fetcher.status(&url("index.html"), 503, "busy");

        let err = f.sync.install().await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn first_activation_promotes_staging_and_records_manifest() {
        let m = manifest(&[("/", "h1"), ("index.html", "h1")]);
        let f = fixture(m.clone(), &["index.html"]);
        f.store
            .put(&f.names.staging, &url("index.html"), resource("<html>", 200))
            .await
            .unwrap();
        // Anything lying around in content predates any record and goes
        f.store
            .put(&f.names.content, &url("stale.js"), resource("old", 200))
            .await
            .unwrap();

        f.sync.activate().await.unwrap();

        let content = f.store.keys(&f.names.content).await.unwrap();
        assert_eq!(content, vec![url("index.html")]);
        assert!(f.store.keys(&f.names.staging).await.unwrap().is_empty());

        let record = f
            .store
            .get(&f.names.manifest, MANIFEST_RECORD_KEY)
            .await
            .unwrap()
            .unwrap();
        let recorded = ResourceManifest::from_json(record.body_str().unwrap()).unwrap();
        assert_eq!(recorded, m);
        assert_eq!(f.host.claim_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upgrade_drops_removed_and_changed_entries() {
        // Worked example: "/" changed checksum, b.js removed, a.js kept
        let new = manifest(&[("/", "h1"), ("a.js", "h2")]);
        let old = manifest(&[("/", "h0"), ("a.js", "h2"), ("b.js", "h3")]);
        let f = fixture(new, &[]);

        f.store
            .put(
                &f.names.manifest,
                MANIFEST_RECORD_KEY,
                CachedResource::json(old.to_json().unwrap()),
            )
            .await
            .unwrap();
        for (path, body) in [("", "old-root"), ("a.js", "old-a"), ("b.js", "old-b")] {
            f.store
                .put(&f.names.content, &url(path), resource(body, 200))
                .await
                .unwrap();
        }
        // Staging carries a fresh root; a.js was not re-fetched
        f.store
            .put(&f.names.staging, &url(""), resource("fresh-root", 200))
            .await
            .unwrap();

        f.sync.activate().await.unwrap();

        assert!(f.store.get(&f.names.content, &url("b.js")).await.unwrap().is_none());
        let root = f.store.get(&f.names.content, &url("")).await.unwrap().unwrap();
        assert_eq!(root.body, b"fresh-root");
        let a = f.store.get(&f.names.content, &url("a.js")).await.unwrap().unwrap();
        assert_eq!(a.body, b"old-a");
        assert!(f.store.keys(&f.names.staging).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upgrade_staging_overwrites_retained_entries() {
        let new = manifest(&[("a.js", "h2")]);
        let old = manifest(&[("a.js", "h2")]);
        let f = fixture(new, &[]);

        f.store
            .put(
                &f.names.manifest,
                MANIFEST_RECORD_KEY,
                CachedResource::json(old.to_json().unwrap()),
            )
            .await
            .unwrap();
        f.store
            .put(&f.names.content, &url("a.js"), resource("old-a", 200))
            .await
            .unwrap();
        f.store
            .put(&f.names.staging, &url("a.js"), resource("fresh-a", 200))
            .await
            .unwrap();

        f.sync.activate().await.unwrap();

        let a = f.store.get(&f.names.content, &url("a.js")).await.unwrap().unwrap();
        assert_eq!(a.body, b"fresh-a");
    }

    /// Store wrapper that fails the first `keys()` call on a partition
    struct FailingStore {
        inner: MemoryStore,
        fail_partition: String,
        armed: AtomicBool,
    }

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, partition: &str, k: &str) -> SyncResult<Option<CachedResource>> {
            self.inner.get(partition, k).await
        }

        async fn put(&self, partition: &str, k: &str, r: CachedResource) -> SyncResult<()> {
            self.inner.put(partition, k, r).await
        }

        async fn delete(&self, partition: &str, k: &str) -> SyncResult<bool> {
            self.inner.delete(partition, k).await
        }

        async fn keys(&self, partition: &str) -> SyncResult<Vec<String>> {
            if partition == self.fail_partition && self.armed.swap(false, Ordering::SeqCst) {
                return Err(SyncError::store("simulated storage failure"));
            }
            self.inner.keys(partition).await
        }

        async fn drop_partition(&self, partition: &str) -> SyncResult<()> {
            self.inner.drop_partition(partition).await
        }
    }

    #[tokio::test]
    async fn activation_failure_invalidates_all_partitions() {
        let names = PartitionNames::default();
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_partition: names.content.clone(),
            armed: AtomicBool::new(true),
        });
        let old = manifest(&[("a.js", "h2")]);
        store
            .put(
                &names.manifest,
                MANIFEST_RECORD_KEY,
                CachedResource::json(old.to_json().unwrap()),
            )
            .await
            .unwrap();
        store
            .put(&names.content, &url("a.js"), resource("a", 200))
            .await
            .unwrap();
        store
            .put(&names.staging, &url("a.js"), resource("fresh", 200))
            .await
            .unwrap();

        let sync = CacheSynchronizer::new(
            manifest(&[("a.js", "h9")]),
            SyncConfig::new(ORIGIN, vec![]),
            store.clone(),
            Arc::new(ScriptedFetcher::default()),
            Arc::new(RecordingHost::default()),
        );

        // The failure is swallowed, never propagated
        sync.activate().await.unwrap();

        assert!(store
            .get(&names.manifest, MANIFEST_RECORD_KEY)
            .await
            .unwrap()
            .is_none());
        assert!(store.keys(&names.content).await.unwrap().is_empty());
        assert!(store.keys(&names.staging).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_get_requests_pass_through() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        let request = Request {
            method: "POST".to_string(),
            url: url("a.js"),
        };

        let outcome = f.sync.handle_fetch(&request).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Passthrough);
        assert!(f.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn unknown_resources_pass_through() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);

        let outcome = f
            .sync
            .handle_fetch(&Request::get(url("other.js")))
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Passthrough);

        let foreign = f
            .sync
            .handle_fetch(&Request::get("https://cdn.example/a.js"))
            .await
            .unwrap();
        assert_eq!(foreign, FetchOutcome::Passthrough);
        assert!(f.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn root_is_served_online_first_and_cached() {
        let f = fixture(manifest(&[("/", "h1")]), &[]);
        f.fetcher.ok(&url(""), "live-root");

        let outcome = f.sync.handle_fetch(&Request::get(url(""))).await.unwrap();

        match outcome {
            FetchOutcome::Response(r) => assert_eq!(r.body, b"live-root"),
            other => panic!("expected response, got {other:?}"),
        }
        let cached = f.store.get(&f.names.content, &url("")).await.unwrap().unwrap();
        assert_eq!(cached.body, b"live-root");
    }

    #[tokio::test]
    async fn root_falls_back_to_cache_when_offline() {
        let f = fixture(manifest(&[("/", "h1")]), &[]);
        f.fetcher.fail(&url(""));
        f.store
            .put(&f.names.content, &url(""), resource("cached-root", 200))
            .await
            .unwrap();

        let outcome = f.sync.handle_fetch(&Request::get(url(""))).await.unwrap();
        match outcome {
            FetchOutcome::Response(r) => assert_eq!(r.body, b"cached-root"),
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn root_failure_propagates_without_cache() {
        let f = fixture(manifest(&[("/", "h1")]), &[]);
        f.fetcher.fail(&url(""));

        let err = f
            .sync
            .handle_fetch(&Request::get(url("")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("network unreachable"));
    }

    #[tokio::test]
    async fn fragment_navigation_is_treated_as_root() {
        let f = fixture(manifest(&[("/", "h1")]), &[]);
        let fragment_url = format!("{ORIGIN}/#profile");
        f.fetcher.ok(&fragment_url, "live-root");

        let outcome = f
            .sync
            .handle_fetch(&Request::get(&fragment_url))
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Response(_)));
        assert_eq!(f.fetcher.fetched(), vec![fragment_url]);
    }

    #[tokio::test]
    async fn cache_first_hit_never_touches_the_network() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        f.store
            .put(&f.names.content, &url("a.js"), resource("cached-a", 200))
            .await
            .unwrap();

        let outcome = f.sync.handle_fetch(&Request::get(url("a.js"))).await.unwrap();
        match outcome {
            FetchOutcome::Response(r) => assert_eq!(r.body, b"cached-a"),
            other => panic!("expected response, got {other:?}"),
        }
        assert!(f.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn cache_first_miss_fetches_and_populates() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        f.fetcher.ok(&url("a.js"), "live-a");

        let outcome = f.sync.handle_fetch(&Request::get(url("a.js"))).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Response(_)));

        let cached = f
            .store
            .get(&f.names.content, &url("a.js"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.body, b"live-a");
    }

    #[tokio::test]
    async fn cache_first_failed_response_is_returned_uncached() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        f.fetcher.status(&url("a.js"), 404, "gone");

        let outcome = f.sync.handle_fetch(&Request::get(url("a.js"))).await.unwrap();
        match outcome {
            FetchOutcome::Response(r) => assert_eq!(r.status, 404),
            other => panic!("expected response, got {other:?}"),
        }
        assert!(f
            .store
            .get(&f.names.content, &url("a.js"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn cache_bust_request_is_intercepted_and_keyed_by_full_url() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        let busted = url("a.js?v=abc123");
        f.fetcher.ok(&busted, "live-a");

        let outcome = f.sync.handle_fetch(&Request::get(&busted)).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Response(_)));

        // The cache entry lives under the request URL, query and all
        assert!(f.store.get(&f.names.content, &busted).await.unwrap().is_some());
        assert!(f.store.get(&f.names.content, &url("a.js")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn download_offline_fetches_only_missing_resources() {
        let f = fixture(manifest(&[("/", "h1"), ("a.js", "h2"), ("b.js", "h3")]), &[]);
        f.store
            .put(&f.names.content, &url("a.js"), resource("have-a", 200))
            .await
            .unwrap();
        f.fetcher.ok(&url(""), "root");
        f.fetcher.ok(&url("b.js"), "b");

        let downloaded = f.sync.download_offline().await.unwrap();

        assert_eq!(downloaded, 2);
        assert!(f.store.get(&f.names.content, &url("")).await.unwrap().is_some());
        assert!(f.store.get(&f.names.content, &url("b.js")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn download_offline_ignores_cache_busted_aliases() {
        // Present-key derivation keeps the ?v= suffix, so a busted entry
        // does not satisfy its manifest key and the resource re-downloads.
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        f.store
            .put(&f.names.content, &url("a.js?v=1"), resource("busted", 200))
            .await
            .unwrap();
        f.fetcher.ok(&url("a.js"), "plain");

        let downloaded = f.sync.download_offline().await.unwrap();
        assert_eq!(downloaded, 1);
    }

    #[tokio::test]
    async fn skip_waiting_message_reaches_the_host() {
        let f = fixture(manifest(&[]), &[]);

        f.sync.handle_message("skipWaiting").await.unwrap();

        assert_eq!(f.host.skip_waiting_calls.load(Ordering::SeqCst), 1);
        assert!(f.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn download_message_triggers_the_batch() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);
        f.fetcher.ok(&url("a.js"), "a");

        f.sync.handle_message("downloadOffline").await.unwrap();

        assert!(f.store.get(&f.names.content, &url("a.js")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_messages_are_ignored() {
        let f = fixture(manifest(&[("a.js", "h2")]), &[]);

        f.sync.handle_message("purgeEverything").await.unwrap();

        assert_eq!(f.host.skip_waiting_calls.load(Ordering::SeqCst), 0);
        assert!(f.fetcher.fetched().is_empty());
    }

    #[test]
    fn control_message_literals() {
        assert_eq!(ControlMessage::parse("skipWaiting"), Some(ControlMessage::SkipWaiting));
        assert_eq!(
            ControlMessage::parse("downloadOffline"),
            Some(ControlMessage::DownloadOffline)
        );
        assert_eq!(ControlMessage::parse("SkipWaiting"), None);
        assert_eq!(ControlMessage::parse(""), None);
    }
}
