//! Seams the sampler is generic over.
//!
//! - [`source::DataSource`] - where entities come from
//! - [`store::EntityStore`] - where new entities are persisted

pub mod source;
pub mod store;

pub use source::DataSource;
pub use store::{distinct_new, EntityStore};
