//! Validation and filtering system
//!
//! This module provides a declarative approach to validating and filtering form
//! submissions before they reach the create/update handlers: a static
//! [`FormSchema`] of [`FieldSpec`]s, reusable validators and filters, and the
//! [`Submission`] extractor.

pub mod extractor;
pub mod filters;
pub mod schema;
pub mod validators;

pub use extractor::Submission;
pub use schema::{
    CleanData, FieldSpec, FieldType, FormSchema, FormSchemaBuilder, UnknownFields,
    ValidationMode, ValidationResult,
};
