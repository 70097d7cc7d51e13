//! Core module containing fundamental traits and types for the framework

pub mod error;
pub mod field;
pub mod object;
pub mod query;
pub mod service;
pub mod validation;

pub use error::{FieldError, HalError, HalResult, ValidationErrors};
pub use field::{FieldFormat, FieldValue};
pub use object::DomainObject;
pub use query::{DEFAULT_PER_PAGE, Page, PageQuery, PathParams};
pub use service::QuerySource;
