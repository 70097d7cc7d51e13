//! HTTP binding of one collection
//!
//! A [`HalCollection`] owns the index, resource and (optional) form views of a
//! collection, registers their routes in the application [`RouteTable`] and
//! serves them through axum:
//!
//! | Verb    | Path            | View                        |
//! |---------|-----------------|-----------------------------|
//! | GET     | /{name}         | index                       |
//! | POST    | /{name}         | form, create                |
//! | GET     | /{name}/{id}    | resource                    |
//! | PATCH   | /{name}/{id}    | form, partial update        |
//! | PUT     | /{name}/{id}    | form, full update           |
//! | OPTIONS | /{name}[/{id}]  | form, capability or schema  |

use crate::config::{CollectionConfig, ViewsConfig};
use crate::core::error::{HalError, HalResult};
use crate::core::query::{PageQuery, PathParams};
use crate::core::service::QuerySource;
use crate::core::validation::{CleanData, FormSchema, Submission};
use crate::routing::{PathTemplate, RouteTable};
use crate::views::{FormContext, FormHandler, FormView, HalResponse, IndexView, ResourceView};
use async_trait::async_trait;
use axum::{
    Router,
    extract::{OriginalUri, Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, Method, header},
    routing::{MethodRouter, get},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Describes how a collection registers and serves its routes
pub trait CollectionDescriptor: Send + Sync {
    /// Collection name, also the index endpoint (e.g., "workouts")
    fn name(&self) -> &str;

    /// Record the collection's routes so URLs can be built for them
    fn register_routes(&self, table: &mut RouteTable) -> HalResult<()>;

    /// Build the axum routes, resolving URLs through the complete table
    fn build_routes(&self, routing: Arc<RouteTable>) -> Router;
}

/// Form handler of collections that accept no submissions
pub struct ReadOnly;

#[async_trait]
impl FormHandler for ReadOnly {
    async fn create(&self, ctx: &FormContext<'_>, _clean: CleanData) -> HalResult<HalResponse> {
        Err(HalError::MethodNotAllowed {
            method: ctx.method().to_string(),
        })
    }

    async fn update(&self, ctx: &FormContext<'_>, _clean: CleanData) -> HalResult<HalResponse> {
        Err(HalError::MethodNotAllowed {
            method: ctx.method().to_string(),
        })
    }
}

/// Index, resource and form views of one collection
pub struct HalCollection<S: QuerySource, H: FormHandler = ReadOnly> {
    name: String,
    item: String,
    collection_path: String,
    item_path: PathTemplate,
    index: Arc<IndexView<S>>,
    resource: Arc<ResourceView<S>>,
    form: Option<Arc<FormView<H>>>,
}

impl<S: QuerySource> HalCollection<S, ReadOnly> {
    /// Start configuring collection `name` whose items are served at endpoint `item`
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let workouts = HalCollection::builder("workouts", "workout", store.clone())
    ///     .per_page(2)
    ///     .form(schema, WorkoutForm::new(store))
    ///     .build()?;
    /// ```
    pub fn builder(
        name: impl Into<String>,
        item: impl Into<String>,
        source: Arc<S>,
    ) -> HalCollectionBuilder<S, ReadOnly> {
        let name = name.into();
        HalCollectionBuilder {
            collection_path: format!("/{}", name),
            name,
            item: item.into(),
            id_param: "id".to_string(),
            source,
            per_page: None,
            max_per_page: None,
            raw: false,
            find: false,
            config: None,
            form: None,
        }
    }
}

impl<S: QuerySource, H: FormHandler> HalCollection<S, H> {
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Endpoint name of the form routes, e.g. `workout_form`
    pub fn form_endpoint(&self) -> String {
        format!("{}_form", self.item)
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    pub fn item_path(&self) -> &str {
        self.item_path.as_str()
    }

    pub fn index(&self) -> &IndexView<S> {
        &self.index
    }

    pub fn resource(&self) -> &ResourceView<S> {
        &self.resource
    }

    pub fn form(&self) -> Option<&FormView<H>> {
        self.form.as_deref()
    }
}

/// Verbs the form serves on the collection path
const COLLECTION_FORM_METHODS: [Method; 2] = [Method::POST, Method::OPTIONS];

/// Verbs the form serves on the item path
const ITEM_FORM_METHODS: [Method; 3] = [Method::PATCH, Method::PUT, Method::OPTIONS];

impl<S: QuerySource, H: FormHandler> CollectionDescriptor for HalCollection<S, H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_routes(&self, table: &mut RouteTable) -> HalResult<()> {
        table.add(self.name.clone(), &self.collection_path, &[Method::GET])?;
        table.add(self.item.clone(), self.item_path.as_str(), &[Method::GET])?;
        if self.form.is_some() {
            let endpoint = self.form_endpoint();
            table.add(endpoint.clone(), &self.collection_path, &COLLECTION_FORM_METHODS)?;
            table.add(endpoint, self.item_path.as_str(), &ITEM_FORM_METHODS)?;
        }
        Ok(())
    }

    fn build_routes(&self, routing: Arc<RouteTable>) -> Router {
        let state = CollectionState {
            routing,
            item_path: self.item_path.clone(),
            index: self.index.clone(),
            resource: self.resource.clone(),
            form: self.form.clone(),
        };

        let mut collection_route: MethodRouter<CollectionState<S, H>> = get(list::<S, H>);
        let mut item_route: MethodRouter<CollectionState<S, H>> = get(show::<S, H>);
        if self.form.is_some() {
            collection_route = collection_route
                .post(submit::<S, H>)
                .options(options_collection::<S, H>);
            item_route = item_route
                .patch(submit_item::<S, H>)
                .put(submit_item::<S, H>)
                .options(options_item::<S, H>);
        }

        Router::new()
            .route(&self.collection_path, collection_route)
            .route(self.item_path.as_str(), item_route)
            .with_state(state)
    }
}

/// Builder for [`HalCollection`]
pub struct HalCollectionBuilder<S: QuerySource, H: FormHandler> {
    name: String,
    item: String,
    collection_path: String,
    id_param: String,
    source: Arc<S>,
    per_page: Option<usize>,
    max_per_page: Option<usize>,
    raw: bool,
    find: bool,
    config: Option<CollectionConfig>,
    form: Option<(FormSchema, Arc<H>)>,
}

impl<S: QuerySource, H: FormHandler> HalCollectionBuilder<S, H> {
    /// Serve the collection under `path` instead of `/{name}`
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.collection_path = path.into();
        self
    }

    /// Name of the item path parameter (default `id`)
    pub fn id_param(mut self, name: impl Into<String>) -> Self {
        self.id_param = name.into();
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

    /// Embed raw projections in the index instead of item resources
    pub fn embed_raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Advertise the item path as a templated `find` link on the index
    pub fn find_link(mut self) -> Self {
        self.find = true;
        self
    }

    /// Apply this collection's entry of `config`, if any
    pub fn with_config(mut self, config: &ViewsConfig) -> Self {
        self.config = config.collection(&self.name).cloned();
        self
    }

    /// Accept submissions validated against `schema`
    pub fn form<F: FormHandler>(self, schema: FormSchema, handler: F) -> HalCollectionBuilder<S, F> {
        HalCollectionBuilder {
            name: self.name,
            item: self.item,
            collection_path: self.collection_path,
            id_param: self.id_param,
            source: self.source,
            per_page: self.per_page,
            max_per_page: self.max_per_page,
            raw: self.raw,
            find: self.find,
            config: self.config,
            form: Some((schema, Arc::new(handler))),
        }
    }

    pub fn build(self) -> HalResult<HalCollection<S, H>> {
        if self.item == self.name {
            return Err(HalError::Config(format!(
                "collection '{}' and its items need distinct endpoint names",
                self.name
            )));
        }
        let collection_path = self.collection_path.trim_end_matches('/').to_string();
        let item_path = PathTemplate::parse(&format!("{}/{{{}}}", collection_path, self.id_param))?;
        PathTemplate::parse(&collection_path)?;

        let mut index = IndexView::builder(self.name.clone(), self.source.clone());
        index = if self.raw {
            index.embed_raw()
        } else {
            index.subresource(self.item.clone())
        };
        if let Some(per_page) = self.per_page {
            index = index.per_page(per_page);
        }
        if let Some(max_per_page) = self.max_per_page {
            index = index.max_per_page(max_per_page);
        }
        if self.find {
            index = index.find(item_path.as_str());
        }
        if let Some(config) = &self.config {
            index = index.with_config(config);
        }
        let index = index.build()?;

        let form_endpoint = format!("{}_form", self.item);
        let form = self.form.map(|(schema, handler)| {
            let view = FormView::new(form_endpoint, schema, handler);
            match &self.config {
                Some(config) => view.with_config(config),
                None => view,
            }
        });

        tracing::debug!(
            collection = %self.name,
            item = %self.item,
            path = %collection_path,
            writable = form.is_some(),
            "collection configured"
        );

        Ok(HalCollection {
            resource: Arc::new(ResourceView::new(self.item.clone(), self.source)),
            name: self.name,
            item: self.item,
            collection_path,
            item_path,
            index: Arc::new(index),
            form: form.map(Arc::new),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

struct CollectionState<S: QuerySource, H: FormHandler> {
    routing: Arc<RouteTable>,
    item_path: PathTemplate,
    index: Arc<IndexView<S>>,
    resource: Arc<ResourceView<S>>,
    form: Option<Arc<FormView<H>>>,
}

impl<S: QuerySource, H: FormHandler> Clone for CollectionState<S, H> {
    fn clone(&self) -> Self {
        Self {
            routing: self.routing.clone(),
            item_path: self.item_path.clone(),
            index: self.index.clone(),
            resource: self.resource.clone(),
            form: self.form.clone(),
        }
    }
}

impl<S: QuerySource, H: FormHandler> CollectionState<S, H> {
    /// Path parameters in template order
    fn path_params(&self, raw: HashMap<String, String>) -> PathParams {
        self.item_path
            .arguments()
            .filter_map(|name| raw.get(name).map(|value| (name.to_string(), value.clone())))
            .collect()
    }

    fn form(&self) -> HalResult<&FormView<H>> {
        self.form.as_deref().ok_or_else(|| HalError::MethodNotAllowed {
            method: "form submission".to_string(),
        })
    }
}

async fn list<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> HalResult<HalResponse> {
    let Query(query) = query.map_err(|rejection| HalError::bad_request(rejection.body_text()))?;
    state.index.get(state.routing.as_ref(), &query).await
}

async fn show<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    OriginalUri(uri): OriginalUri,
    Path(raw): Path<HashMap<String, String>>,
) -> HalResult<HalResponse> {
    let params = state.path_params(raw);
    state.resource.get(uri.path(), &params).await
}

async fn submit<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    submission: Submission,
) -> HalResult<HalResponse> {
    state
        .form()?
        .dispatch(
            state.routing.as_ref(),
            &submission.method,
            &PathParams::new(),
            submission.payload,
        )
        .await
}

async fn submit_item<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    Path(raw): Path<HashMap<String, String>>,
    submission: Submission,
) -> HalResult<HalResponse> {
    let params = state.path_params(raw);
    state
        .form()?
        .dispatch(
            state.routing.as_ref(),
            &submission.method,
            &params,
            submission.payload,
        )
        .await
}

fn accept(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
}

async fn options_collection<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    headers: HeaderMap,
) -> HalResult<HalResponse> {
    state
        .form()?
        .options(accept(&headers), &COLLECTION_FORM_METHODS)
}

async fn options_item<S: QuerySource, H: FormHandler>(
    State(state): State<CollectionState<S, H>>,
    headers: HeaderMap,
) -> HalResult<HalResponse> {
    state.form()?.options(accept(&headers), &ITEM_FORM_METHODS)
}
