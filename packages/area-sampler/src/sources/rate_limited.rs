//! Rate-limited data source wrapper.
//!
//! Wraps any DataSource implementation with rate limiting using the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::DataSourceResult;
use crate::query::QueryDescriptor;
use crate::traits::source::DataSource;
use crate::types::entity::EntityRecord;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A data source wrapper that spaces out queries.
pub struct RateLimitedSource<D: DataSource> {
    inner: D,
    limiter: Arc<DefaultRateLimiter>,
}

impl<D: DataSource> RateLimitedSource<D> {
    /// Allow at most `queries_per_minute` queries per minute.
    pub fn per_minute(source: D, queries_per_minute: NonZeroU32) -> Self {
        Self::with_quota(source, Quota::per_minute(queries_per_minute))
    }

    /// Create with a custom quota.
    pub fn with_quota(source: D, quota: Quota) -> Self {
        Self {
            inner: source,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: DataSource> DataSource for RateLimitedSource<D> {
    async fn fetch_entities(&self, query: &QueryDescriptor) -> DataSourceResult<Vec<EntityRecord>> {
        self.limiter.until_ready().await;
        self.inner.fetch_entities(query).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
