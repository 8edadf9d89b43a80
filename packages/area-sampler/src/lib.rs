//! Adaptive Recursive Geospatial Sampler
//!
//! Discovers entities (businesses) of a category around a point. Search
//! sources usually cap how many results one query returns, so a region that
//! yields "too many" new entities is presumed truncated and is searched
//! again as four smaller regions, recursively.
//!
//! # Usage
//!
//! ```rust,ignore
//! use area_sampler::{run_search, Coordinates, Distance, SearchRequest};
//! use area_sampler::sources::HttpDataSource;
//!
//! let source = HttpDataSource::new("http://localhost:4000/search");
//! let request = SearchRequest::new(
//!     "factories",
//!     Distance::kilometers(5.0)?,
//!     Coordinates::new(41.8781, -87.6298)?,
//!     "GoogleMapsData.json",
//! );
//!
//! let report = run_search(&source, &request).await?;
//! println!("{} new entities", report.records_written());
//! ```
//!
//! # Modules
//!
//! - [`geo`] - Child-region offsets and radius refinement
//! - [`query`] - Query descriptors handed to data sources
//! - [`registry`] - Run-scoped dedup registry
//! - [`traits`] - `DataSource` and `EntityStore` abstractions
//! - [`stores`] - JSON file and in-memory stores
//! - [`sources`] - HTTP, rate-limited and mock data sources
//! - [`sampler`] - The recursive search itself
//! - [`config`] - Runtime configuration from the environment
//! - [`testing`] - Helpers for tests

pub mod config;
pub mod error;
pub mod geo;
pub mod query;
pub mod registry;
pub mod sampler;
pub mod sources;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{DataSourceError, GeoError, SamplerError, StoreError};
pub use geo::{child_regions, offset_region, Direction, Offsets};
pub use query::{build_query, query_for_region, QueryDescriptor};
pub use registry::DedupRegistry;
pub use sampler::{
    plan_refinement, run_search, search, Refinement, RegionOutcome, RegionVisit, SearchReport,
};
pub use stores::{JsonFileStore, MemoryStore};
pub use traits::{DataSource, EntityStore};
pub use types::{
    Coordinates, Distance, DistanceUnit, EntityRecord, Region, SamplerConfig, SearchRequest,
};
