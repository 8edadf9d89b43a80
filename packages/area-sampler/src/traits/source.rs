//! Data source trait for answering region queries.
//!
//! A data source owns whatever session is needed to turn a
//! [`QueryDescriptor`] into entity records: a browser page, a scraping API,
//! a canned fixture. The sampler never looks behind this interface.
//!
//! # Contract
//!
//! - A query that legitimately matches nothing returns `Ok(vec![])`.
//! - A page or session that cannot be loaded or parsed returns `Err`.
//! - Result order and capping are unspecified. The sampler infers capping
//!   from how many new entities come back.

use async_trait::async_trait;

use crate::error::DataSourceResult;
use crate::query::QueryDescriptor;
use crate::types::entity::EntityRecord;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the entities matching one region query.
    async fn fetch_entities(&self, query: &QueryDescriptor) -> DataSourceResult<Vec<EntityRecord>>;

    /// Get the source name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
