//! Paginated collection HAL view

use crate::config::CollectionConfig;
use crate::core::error::{HalError, HalResult};
use crate::core::object::DomainObject;
use crate::core::query::{DEFAULT_PER_PAGE, Page, PageQuery, PathParams};
use crate::core::service::QuerySource;
use crate::routing::Routing;
use crate::views::resource::as_resource;
use crate::views::response::HalResponse;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// How items of a page are rendered inside `_embedded`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embedding {
    /// Full HAL resources resolved at the given endpoint
    Subresource(String),
    /// The item's JSON projection as is, without links
    Raw,
}

/// Renders one page of a [`QuerySource`] as a HAL collection
///
/// # Example
///
/// ```rust,ignore
/// let index = IndexView::builder("workouts", store.clone())
///     .subresource("workout")
///     .per_page(2)
///     .build()?;
///
/// let response = index.get(&routes, &PageQuery::new(Some(2), None)).await?;
/// ```
pub struct IndexView<S: QuerySource> {
    name: String,
    source: Arc<S>,
    embedding: Embedding,
    per_page: usize,
    max_per_page: usize,
    find: Option<String>,
}

impl<S: QuerySource> std::fmt::Debug for IndexView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexView")
            .field("name", &self.name)
            .field("embedding", &self.embedding)
            .field("per_page", &self.per_page)
            .field("max_per_page", &self.max_per_page)
            .finish()
    }
}

impl<S: QuerySource> IndexView<S> {
    /// Start configuring an index served under endpoint `name`
    ///
    /// `name` is also the key of the embedded item list.
    pub fn builder(name: impl Into<String>, source: Arc<S>) -> IndexViewBuilder<S> {
        IndexViewBuilder {
            name: name.into(),
            source,
            embedding: None,
            per_page: None,
            max_per_page: None,
            find: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn max_per_page(&self) -> usize {
        self.max_per_page
    }

    /// Fetch the requested page
    ///
    /// Pages past the end of a non-empty range are reported as NotFound; page 1
    /// always exists.
    pub async fn page(&self, query: &PageQuery) -> HalResult<Page<S::Object>> {
        let number = query.page()?;
        let per_page = query.per_page(self.per_page, self.max_per_page)?;

        let page = self.source.paginate(number, per_page).await?;
        if number > 1 && page.items.is_empty() {
            return Err(HalError::not_found(format!("{} page {}", self.name, number)));
        }
        Ok(page)
    }

    /// Navigation links for `page`
    ///
    /// An explicitly requested `per_page` is repeated in every link so that
    /// following them keeps the page size stable.
    pub fn links(
        &self,
        routing: &dyn Routing,
        page: &Page<S::Object>,
        query: &PageQuery,
    ) -> HalResult<Map<String, Value>> {
        let explicit_per_page = query.has_per_page().then_some(page.per_page);
        let href = |number: Option<usize>| -> HalResult<Value> {
            let mut pairs: Vec<(&str, String)> = Vec::new();
            if let Some(number) = number {
                pairs.push(("page", number.to_string()));
            }
            if let Some(per_page) = explicit_per_page {
                pairs.push(("per_page", per_page.to_string()));
            }
            let url = routing.url_for(&self.name, &PathParams::new(), &pairs)?;
            Ok(json!({ "href": url }))
        };

        let mut links = Map::new();
        let self_link = href((page.page != 1).then_some(page.page))?;
        links.insert("self".to_string(), self_link.clone());

        if let Some(template) = &self.find {
            links.insert(
                "find".to_string(),
                json!({ "href": template, "templated": true }),
            );
        }
        if page.total_pages > 0 {
            let last = if page.is_last() {
                self_link
            } else {
                href(Some(page.total_pages))?
            };
            links.insert("last".to_string(), last);
        }
        if let Some(next) = page.next_num() {
            links.insert("next".to_string(), href(Some(next))?);
        }
        if let Some(previous) = page.prev_num() {
            links.insert("previous".to_string(), href(Some(previous))?);
        }
        Ok(links)
    }

    /// Render the items of `page` per the configured embedding
    pub fn embedded(&self, routing: &dyn Routing, items: Vec<S::Object>) -> HalResult<Vec<Value>> {
        items
            .into_iter()
            .map(|item| match &self.embedding {
                Embedding::Subresource(endpoint) => {
                    Ok(Value::Object(as_resource(routing, endpoint, item)?.json()))
                }
                Embedding::Raw => Ok(Value::Object(item.json())),
            })
            .collect()
    }

    /// `{ _embedded: { <name>: [...] }, _links, total, per_page }`
    pub async fn render(&self, routing: &dyn Routing, query: &PageQuery) -> HalResult<Value> {
        let page = self.page(query).await?;
        let links = self.links(routing, &page, query)?;
        let (total, per_page, number) = (page.total, page.per_page, page.page);
        let embedded = self.embedded(routing, page.items)?;

        tracing::debug!(
            collection = %self.name,
            page = number,
            per_page,
            total,
            "rendering collection"
        );

        let mut wrapper = Map::new();
        wrapper.insert(self.name.clone(), Value::Array(embedded));
        Ok(json!({
            "_embedded": wrapper,
            "_links": links,
            "total": total,
            "per_page": per_page,
        }))
    }

    pub async fn get(&self, routing: &dyn Routing, query: &PageQuery) -> HalResult<HalResponse> {
        Ok(HalResponse::hal(self.render(routing, query).await?))
    }
}

/// Builder for [`IndexView`]; configuration errors surface in [`build`](Self::build)
pub struct IndexViewBuilder<S: QuerySource> {
    name: String,
    source: Arc<S>,
    embedding: Option<Embedding>,
    per_page: Option<usize>,
    max_per_page: Option<usize>,
    find: Option<String>,
}

impl<S: QuerySource> IndexViewBuilder<S> {
    /// Embed items as resources of `endpoint`
    pub fn subresource(mut self, endpoint: impl Into<String>) -> Self {
        self.embedding = Some(Embedding::Subresource(endpoint.into()));
        self
    }

    /// Embed raw item projections instead of resources
    pub fn embed_raw(mut self) -> Self {
        self.embedding = Some(Embedding::Raw);
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn max_per_page(mut self, max_per_page: usize) -> Self {
        self.max_per_page = Some(max_per_page);
        self
    }

    /// Advertise a templated `find` link, e.g. `/workouts/{id}`
    pub fn find(mut self, template: impl Into<String>) -> Self {
        self.find = Some(template.into());
        self
    }

    /// Apply page sizes from a configuration entry
    pub fn with_config(mut self, config: &CollectionConfig) -> Self {
        if let Some(per_page) = config.per_page {
            self.per_page = Some(per_page);
        }
        if let Some(max_per_page) = config.max_per_page {
            self.max_per_page = Some(max_per_page);
        }
        self
    }

    pub fn build(self) -> HalResult<IndexView<S>> {
        let embedding = self.embedding.ok_or_else(|| {
            HalError::Config(format!(
                "index '{}' needs a sub-resource endpoint or embed_raw()",
                self.name
            ))
        })?;

        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        let max_per_page = self.max_per_page.unwrap_or(per_page);
        if per_page == 0 || max_per_page == 0 {
            return Err(HalError::Config(format!(
                "index '{}' page sizes must be at least 1",
                self.name
            )));
        }
        if per_page > max_per_page {
            return Err(HalError::Config(format!(
                "index '{}' per_page {} exceeds max_per_page {}",
                self.name, per_page, max_per_page
            )));
        }

        Ok(IndexView {
            name: self.name,
            source: self.source,
            embedding,
            per_page,
            max_per_page,
            find: self.find,
        })
    }
}
