//! Data source implementations.
//!
//! - `HttpDataSource` - Queries a JSON search endpoint
//! - `RateLimitedSource` - Spaces out queries to any source
//! - `MockDataSource` - Scripted responses for tests

pub mod http;
pub mod mock;
pub mod rate_limited;

pub use http::HttpDataSource;
pub use mock::MockDataSource;
pub use rate_limited::RateLimitedSource;
