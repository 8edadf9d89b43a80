//! Domain types shared across the sampler.

pub mod config;
pub mod entity;
pub mod region;

pub use config::{SamplerConfig, SearchRequest};
pub use entity::EntityRecord;
pub use region::{Coordinates, Distance, DistanceUnit, Region};
