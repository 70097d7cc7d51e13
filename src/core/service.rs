//! Storage collaborator traits

use crate::core::error::HalResult;
use crate::core::object::DomainObject;
use crate::core::query::{Page, PathParams};
use async_trait::async_trait;

/// Query capability the views need from a storage backend
///
/// The views are agnostic to the underlying storage mechanism. Implementations
/// must give each request an isolated view of the data and must return
/// collections in a stable, deterministic order so that pagination is
/// consistent across calls.
#[async_trait]
pub trait QuerySource: Send + Sync + 'static {
    /// The domain object this source yields
    type Object: DomainObject;

    /// First object matching every path parameter, if any
    async fn filter_by(&self, params: &PathParams) -> HalResult<Option<Self::Object>>;

    /// One page of the collection
    ///
    /// `page` starts at 1 and `per_page` is already clamped by the view.
    async fn paginate(&self, page: usize, per_page: usize) -> HalResult<Page<Self::Object>>;
}
