//! Configuration for a search run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::types::region::{Coordinates, Distance, Region};

/// Controls when a region is refined and when refinement stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Minimum number of new entities that marks a region as saturated.
    ///
    /// A saturated region probably hit the source's result cap and is
    /// subdivided. Default: 10.
    pub saturation_threshold: usize,

    /// Deepest level that may still be subdivided (root is depth 0).
    ///
    /// A saturated region at this depth is forced terminal. Default: 8.
    pub max_depth: u32,

    /// Smallest child radius, in meters, worth querying.
    ///
    /// A saturated region whose refined radius falls below this is forced
    /// terminal. Default: 25.
    pub min_radius_m: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            saturation_threshold: 10,
            max_depth: 8,
            min_radius_m: 25.0,
        }
    }
}

impl SamplerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the saturation threshold.
    pub fn with_saturation_threshold(mut self, threshold: usize) -> Self {
        self.saturation_threshold = threshold;
        self
    }

    /// Set the maximum subdivision depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the minimum child radius in meters.
    pub fn with_min_radius_m(mut self, meters: f64) -> Self {
        self.min_radius_m = meters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.saturation_threshold == 0 {
            return Err(SamplerError::invalid_config(
                "saturation_threshold must be at least 1",
            ));
        }
        if !self.min_radius_m.is_finite() || self.min_radius_m < 0.0 {
            return Err(SamplerError::invalid_config(format!(
                "min_radius_m must be a non-negative number, got {}",
                self.min_radius_m
            )));
        }
        Ok(())
    }
}

/// Everything needed to start a root search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Category text, e.g. "factories"
    pub category: String,

    /// Initial radius
    pub radius: Distance,

    /// Root center
    pub center: Coordinates,

    /// Where results are persisted
    pub store_path: PathBuf,

    #[serde(default)]
    pub config: SamplerConfig,
}

impl SearchRequest {
    pub fn new(
        category: impl Into<String>,
        radius: Distance,
        center: Coordinates,
        store_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            category: category.into(),
            radius,
            center,
            store_path: store_path.into(),
            config: SamplerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    /// The root region of this request.
    pub fn region(&self) -> Region {
        Region::new(self.center, self.radius)
    }

    /// Re-check invariants that deserialized or hand-built requests may break.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(SamplerError::invalid_config("category must not be empty"));
        }
        self.region().validate()?;
        self.config.validate()
    }
}
