//! In-memory implementation of QuerySource for testing and development

use crate::core::error::{HalError, HalResult};
use crate::core::object::DomainObject;
use crate::core::query::{Page, PathParams};
use crate::core::service::QuerySource;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Order in which records are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest id first
    #[default]
    Ascending,
    /// Newest id first
    Descending,
}

struct Records<T> {
    next_id: i64,
    items: BTreeMap<i64, T>,
}

/// In-memory record store with auto-incrementing integer ids
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Listing order is by id, so pagination is deterministic.
pub struct InMemoryStore<T> {
    records: Arc<RwLock<Records<T>>>,
    order: SortOrder,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            order: self.order,
        }
    }
}

impl<T: DomainObject + Clone> InMemoryStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records {
                next_id: 1,
                items: BTreeMap::new(),
            })),
            order: SortOrder::Ascending,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Insert a record built from its freshly allocated id
    pub fn insert_with<F>(&self, build: F) -> HalResult<T>
    where
        F: FnOnce(i64) -> T,
    {
        let mut records = self
            .records
            .write()
            .map_err(|e| HalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = records.next_id;
        records.next_id += 1;
        let record = build(id);
        records.items.insert(id, record.clone());

        tracing::debug!(id, "record inserted");
        Ok(record)
    }

    /// Modify a record in place; fields the closure leaves alone keep their values
    pub fn update_with<F>(&self, id: i64, apply: F) -> HalResult<T>
    where
        F: FnOnce(&mut T) -> HalResult<()>,
    {
        let mut records = self
            .records
            .write()
            .map_err(|e| HalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let record = records
            .items
            .get_mut(&id)
            .ok_or_else(|| HalError::not_found(format!("record {}", id)))?;
        apply(record)?;

        tracing::debug!(id, "record updated");
        Ok(record.clone())
    }

    pub fn get(&self, id: i64) -> HalResult<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| HalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.items.get(&id).cloned())
    }

    /// Every record, in listing order
    pub fn list(&self) -> HalResult<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| HalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(match self.order {
            SortOrder::Ascending => records.items.values().cloned().collect(),
            SortOrder::Descending => records.items.values().rev().cloned().collect(),
        })
    }

    pub fn len(&self) -> HalResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| HalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.items.len())
    }

    pub fn is_empty(&self) -> HalResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: DomainObject + Clone> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: DomainObject + Clone> QuerySource for InMemoryStore<T> {
    type Object = T;

    async fn filter_by(&self, params: &PathParams) -> HalResult<Option<T>> {
        Ok(self.list()?.into_iter().find(|record| {
            params.iter().all(|(name, expected)| {
                record
                    .attribute(name)
                    .and_then(|value| value.to_path_segment())
                    .is_some_and(|actual| actual == *expected)
            })
        }))
    }

    async fn paginate(&self, page: usize, per_page: usize) -> HalResult<Page<T>> {
        Ok(Page::from_slice(&self.list()?, page, per_page))
    }
}
