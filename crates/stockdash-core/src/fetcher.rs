//! The asynchronous seam between the dashboard and its data sources.
//!
//! A [`ResourceFetcher`] turns a [`ResourceKey`] into a raw payload. The
//! resource store decides *when* to call it; implementations only decide
//! *how*.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::{error::Result, record::NestedRecord, types::ResourceKey};

/// Source of raw resource payloads.
///
/// Implementations must not retain per-key state; the store owns caching,
/// deduplication and staleness.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + Debug {
    /// Returns the name of this fetcher (e.g., "HTTP").
    fn name(&self) -> &str;

    /// Fetches the payload identified by `key`.
    async fn fetch(&self, key: &ResourceKey) -> Result<NestedRecord>;
}

#[async_trait]
impl<F: ResourceFetcher + ?Sized> ResourceFetcher for Arc<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, key: &ResourceKey) -> Result<NestedRecord> {
        (**self).fetch(key).await
    }
}

#[async_trait]
impl<F: ResourceFetcher + ?Sized> ResourceFetcher for &F {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, key: &ResourceKey) -> Result<NestedRecord> {
        (**self).fetch(key).await
    }
}
