//! Mock data source for testing.
//!
//! Provides a configurable mock implementation of the DataSource trait.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{DataSourceError, DataSourceResult};
use crate::query::QueryDescriptor;
use crate::traits::source::DataSource;
use crate::types::entity::EntityRecord;

type Handler = dyn Fn(&QueryDescriptor, usize) -> DataSourceResult<Vec<EntityRecord>> + Send + Sync;

#[derive(Debug, Clone)]
enum MockResponse {
    Entities(Vec<EntityRecord>),
    Failure(String),
}

/// Mock data source for testing.
///
/// Scripted responses are consumed in call order. Once they run out, the
/// handler (if any) answers, receiving the query and the zero-based call
/// index. With neither, queries return no entities.
///
/// # Example
///
/// ```rust
/// use area_sampler::sources::MockDataSource;
/// use area_sampler::EntityRecord;
///
/// let mock = MockDataSource::new()
///     .respond_with(vec![EntityRecord::new("Acme Factory")])
///     .fail_with("page did not load");
/// ```
#[derive(Default, Clone)]
pub struct MockDataSource {
    scripted: Arc<RwLock<VecDeque<MockResponse>>>,
    handler: Option<Arc<Handler>>,
    calls: Arc<RwLock<Vec<QueryDescriptor>>>,
}

impl MockDataSource {
    /// Create a mock that returns nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn respond_with(self, records: Vec<EntityRecord>) -> Self {
        self.scripted
            .write()
            .unwrap()
            .push_back(MockResponse::Entities(records));
        self
    }

    /// Queue a failed response.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.scripted
            .write()
            .unwrap()
            .push_back(MockResponse::Failure(message.into()));
        self
    }

    /// Answer unscripted calls with `handler(query, call_index)`.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&QueryDescriptor, usize) -> DataSourceResult<Vec<EntityRecord>> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Get the number of queries received.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Get the queries received, in order.
    pub fn calls(&self) -> Vec<QueryDescriptor> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_entities(&self, query: &QueryDescriptor) -> DataSourceResult<Vec<EntityRecord>> {
        let index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(query.clone());
            calls.len() - 1
        };

        let scripted = self.scripted.write().unwrap().pop_front();
        match scripted {
            Some(MockResponse::Entities(records)) => Ok(records),
            Some(MockResponse::Failure(message)) => Err(DataSourceError::Unavailable(message)),
            None => match &self.handler {
                Some(handler) => handler(query, index),
                None => Ok(Vec::new()),
            },
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
