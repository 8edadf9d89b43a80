use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::num::NonZeroU32;

use crate::sources::{HttpDataSource, RateLimitedSource};

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 20;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Search endpoint answering region queries with entity JSON
    pub source_url: String,
    pub source_token: Option<String>,
    pub requests_per_minute: NonZeroU32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let requests_per_minute = match lookup("AREA_SAMPLER_REQUESTS_PER_MINUTE") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroU32>()
                .context("AREA_SAMPLER_REQUESTS_PER_MINUTE must be a positive integer")?,
            None => NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE)
                .context("default request rate must be positive")?,
        };

        Ok(Self {
            source_url: lookup("AREA_SAMPLER_SOURCE_URL")
                .context("AREA_SAMPLER_SOURCE_URL must be set")?,
            source_token: lookup("AREA_SAMPLER_SOURCE_TOKEN").filter(|t| !t.is_empty()),
            requests_per_minute,
        })
    }

    /// The rate-limited HTTP source described by this config
    pub fn data_source(&self) -> RateLimitedSource<HttpDataSource> {
        let mut source = HttpDataSource::new(&self.source_url);
        if let Some(token) = &self.source_token {
            source = source.with_token(token);
        }
        RateLimitedSource::per_minute(source, self.requests_per_minute)
    }
}
