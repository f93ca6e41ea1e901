//! Recursive sitemap resolution.
//!
//! A URL set resolves to its own entries. A sitemap index fans out one tokio
//! task per referenced sitemap; each task fetches its document and resolves
//! it recursively. The parent waits for every branch before deciding, and the
//! whole tree succeeds or fails as a unit: any failing branch discards all
//! collected URLs. Dropping a resolution future aborts its outstanding
//! branches.

use crate::acquisition::http_client::{FetchError, Fetcher};
use crate::cartography::fetch_pool::{FetchPool, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::cartography::sitemap::{classify, SitemapDocument, SitemapRef, SitemapUrl};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors surfaced by a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload is neither a non-empty URL set nor a non-empty index.
    #[error("unknown sitemap format")]
    UnknownFormat,

    /// A sitemap index references one of its own ancestors.
    #[error("sitemap cycle detected at {url}")]
    Cycle { url: String },

    /// Abandoned because another branch already failed.
    #[error("resolution cancelled")]
    Cancelled,

    #[error("fetch pool closed")]
    PoolClosed,

    /// A branch task panicked or was aborted.
    #[error("resolution task failed: {0}")]
    Task(String),
}

/// Tuning for a `SitemapResolver`.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Upper bound on simultaneous fetches across the whole tree.
    pub max_concurrent_fetches: usize,
    /// Reject index references that point back at an ancestor.
    pub detect_cycles: bool,
    /// Abandon outstanding fetches once any branch fails.
    ///
    /// Off by default: every referenced sitemap is fetched even after a
    /// sibling has failed.
    pub cancel_on_failure: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            detect_cycles: true,
            cancel_on_failure: false,
        }
    }
}

/// Resolves sitemap documents into a flat list of page URLs.
///
/// Cheap to clone; clones share the fetcher and the fetch pool.
#[derive(Clone)]
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetcher>,
    pool: Arc<FetchPool>,
    options: ResolveOptions,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, options: ResolveOptions) -> Self {
        Self {
            fetcher,
            pool: Arc::new(FetchPool::new(options.max_concurrent_fetches)),
            options,
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn pool(&self) -> &FetchPool {
        &self.pool
    }

    /// Resolve an already retrieved sitemap payload.
    ///
    /// A URL set returns immediately without touching the network.
    pub async fn resolve(&self, xml: &str) -> Result<Vec<SitemapUrl>, ResolveError> {
        let cancel = CancellationToken::new();
        let ancestors = Arc::new(HashSet::new());
        self.resolve_document(xml.to_string(), ancestors, cancel)
            .await
    }

    /// Fetch the sitemap at `url` and resolve it.
    pub async fn resolve_url(&self, url: &str) -> Result<Vec<SitemapUrl>, ResolveError> {
        let cancel = CancellationToken::new();
        let body = self.fetch(url, &cancel).await?;
        let ancestors = Arc::new(HashSet::from([url.to_string()]));
        self.resolve_document(body, ancestors, cancel).await
    }

    fn resolve_document(
        &self,
        xml: String,
        ancestors: Arc<HashSet<String>>,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<Vec<SitemapUrl>, ResolveError>> {
        let this = self.clone();
        async move {
            match classify(&xml) {
                SitemapDocument::UrlSet(urls) => Ok(urls),
                SitemapDocument::Index(sitemaps) => {
                    this.fan_out(sitemaps, ancestors, cancel).await
                }
                SitemapDocument::Unknown => Err(ResolveError::UnknownFormat),
            }
        }
        .boxed()
    }

    /// Resolve every index entry concurrently and merge the results.
    async fn fan_out(
        &self,
        sitemaps: Vec<SitemapRef>,
        ancestors: Arc<HashSet<String>>,
        cancel: CancellationToken,
    ) -> Result<Vec<SitemapUrl>, ResolveError> {
        debug!(
            children = sitemaps.len(),
            depth = ancestors.len(),
            "resolving sitemap index"
        );

        let handles = sitemaps
            .into_iter()
            .map(|sitemap| {
                let this = self.clone();
                let ancestors = Arc::clone(&ancestors);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let result = this
                        .resolve_child(sitemap.loc, ancestors, cancel.clone())
                        .await;
                    if result.is_err() && this.options.cancel_on_failure {
                        cancel.cancel();
                    }
                    result
                })
            })
            .collect();
        let mut branches = Branches(handles);

        // Every branch is awaited, even after a failure.
        let mut urls = Vec::new();
        let mut failure: Option<ResolveError> = None;
        for handle in branches.0.iter_mut() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ResolveError::Task(e.to_string())),
            };
            match outcome {
                Ok(mut branch) => urls.append(&mut branch),
                Err(e) => record_failure(&mut failure, e),
            }
        }

        match failure {
            Some(e) => {
                if !urls.is_empty() {
                    warn!(discarded = urls.len(), error = %e, "discarding partial sitemap results");
                }
                Err(e)
            }
            None => Ok(urls),
        }
    }

    async fn resolve_child(
        &self,
        loc: String,
        ancestors: Arc<HashSet<String>>,
        cancel: CancellationToken,
    ) -> Result<Vec<SitemapUrl>, ResolveError> {
        if self.options.detect_cycles && ancestors.contains(&loc) {
            return Err(ResolveError::Cycle { url: loc });
        }

        let body = self.fetch(&loc, &cancel).await?;

        let mut path = (*ancestors).clone();
        path.insert(loc);
        self.resolve_document(body, Arc::new(path), cancel).await
    }

    /// Fetch through the pool, giving up early if the resolution is cancelled.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, ResolveError> {
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(ResolveError::Cancelled),
            body = self.gated_fetch(url) => body,
        }
    }

    async fn gated_fetch(&self, url: &str) -> Result<String, ResolveError> {
        let _permit = self
            .pool
            .acquire()
            .await
            .map_err(|_| ResolveError::PoolClosed)?;
        debug!(%url, "fetching sitemap");
        Ok(self.fetcher.fetch(url).await?)
    }
}

/// Spawned branch tasks of one fan-out level, aborted when the awaiting
/// future is dropped. Aborting a branch drops its own `Branches`, so the
/// whole subtree stops.
struct Branches(Vec<JoinHandle<Result<Vec<SitemapUrl>, ResolveError>>>);

impl Drop for Branches {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Keep the first failure in traversal order, never letting a cancellation
/// mask the failure that caused it.
fn record_failure(slot: &mut Option<ResolveError>, err: ResolveError) {
    match slot {
        None => *slot = Some(err),
        Some(ResolveError::Cancelled) if !matches!(err, ResolveError::Cancelled) => {
            *slot = Some(err)
        }
        Some(_) => {}
    }
}
