//! Network boundary for resource fetches
//!
//! The synchronizer only ever issues HTTP GETs. Install-time shell
//! fetches bypass any intermediate HTTP cache so a new worker version
//! never stages stale bytes.

use crate::error::{SyncError, SyncResult};
use crate::store::CachedResource;
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// How a fetch interacts with intermediate HTTP caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Normal request, caches may answer
    Default,
    /// Bypass caches and revalidate at the origin
    NoCache,
}

/// Abstract HTTP GET boundary
///
/// A non-2xx response is still a response and comes back as an
/// unsuccessful `CachedResource`; only transport-level failures are
/// errors.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a resource by absolute URL
    async fn fetch(&self, url: &str, mode: FetchMode) -> SyncResult<CachedResource>;
}

/// Fetcher over a blocking HTTP client, driven from the async runtime
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a default agent
    pub fn new() -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> SyncResult<CachedResource> {
        let agent = self.agent.clone();
        let target = url.to_string();

        let task = tokio::task::spawn_blocking(move || -> SyncResult<CachedResource> {
            let mut request = agent.get(&target);
            if mode == FetchMode::NoCache {
                request = request.header("Cache-Control", "no-cache");
            }
            let mut response = request
                .call()
                .map_err(|e| SyncError::fetch(&target, e.to_string()))?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| SyncError::fetch(&target, e.to_string()))?;

            Ok(CachedResource::new(body, status, content_type))
        });

        let resource = task
            .await
            .map_err(|e| SyncError::fetch(url, format!("fetch task aborted: {e}")))??;

        debug!(url, status = resource.status, bytes = resource.body.len(), "fetched");
        Ok(resource)
    }
}
