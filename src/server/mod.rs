//! Server module for building HTTP servers from HAL collections

pub mod builder;
pub mod collection;
pub mod registry;

pub use builder::ServerBuilder;
pub use collection::{CollectionDescriptor, HalCollection, HalCollectionBuilder, ReadOnly};
pub use registry::CollectionRegistry;
