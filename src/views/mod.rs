//! HAL views: single resources, paginated collections and forms

pub mod form;
pub mod index;
pub mod resource;
pub mod response;

pub use form::{FormContext, FormHandler, FormState, FormView};
pub use index::{Embedding, IndexView, IndexViewBuilder};
pub use resource::{Resource, ResourceView, as_resource};
pub use response::{HAL_CONTENT_TYPE, HalResponse, SCHEMA_CONTENT_TYPE};
