//! Routing collaborator: route table, URL building and reverse resolution

pub mod registry;
pub mod resolver;

pub use registry::{PathTemplate, RouteDefinition, RouteTable, Routing};
pub use resolver::{ResourceHandle, RouteResolver};
