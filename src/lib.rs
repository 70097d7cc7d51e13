//! # HAL-RS Framework
//!
//! Expose queryable domain objects as HAL+JSON resources over HTTP.
//!
//! ## Features
//!
//! - **Resource views**: one object rendered with `_links.self` and its own links
//! - **Index views**: paginated collections with `self`/`next`/`previous`/`last`
//!   links and a clamped page size
//! - **Form views**: declarative field tables, full validation on create and
//!   partial validation on update, 422 responses listing every failure
//! - **Reverse routing**: canonical item URLs synthesized from object attributes
//! - **Configuration-Based**: page sizes and form strictness from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hal::prelude::*;
//!
//! let store = Arc::new(InMemoryStore::<Workout>::new());
//!
//! let schema = FormSchema::builder("Workout")
//!     .field(FieldSpec::integer("score").required().min(1.0))
//!     .field(FieldSpec::string("title").maps_to("name"))
//!     .build()?;
//!
//! let workouts = HalCollection::builder("workouts", "workout", store.clone())
//!     .per_page(2)
//!     .form(schema, WorkoutForm::new(store))
//!     .build()?;
//!
//! ServerBuilder::new()
//!     .register(workouts)?
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod routing;
pub mod server;
pub mod storage;
pub mod views;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        DomainObject, FieldError, FieldFormat, FieldValue, HalError, HalResult, Page,
        PageQuery, PathParams, QuerySource, ValidationErrors,
    };

    // === Validation ===
    pub use crate::core::validation::{
        CleanData, FieldSpec, FieldType, FormSchema, Submission, UnknownFields, ValidationMode,
        ValidationResult, filters, validators,
    };

    // === Routing ===
    pub use crate::routing::{ResourceHandle, RouteResolver, RouteTable, Routing};

    // === Views ===
    pub use crate::views::{
        Embedding, FormContext, FormHandler, FormView, HalResponse, IndexView, Resource,
        ResourceView, as_resource,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryStore, SortOrder};

    // === Config ===
    pub use crate::config::{CollectionConfig, ViewsConfig};

    // === Server ===
    pub use crate::server::{CollectionDescriptor, HalCollection, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Map, Value, json};
    pub use std::sync::Arc;

    // === Axum ===
    pub use axum::{
        Router,
        http::{Method, StatusCode},
    };
}
