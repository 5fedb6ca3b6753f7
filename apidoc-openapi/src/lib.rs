//! OpenAPI document generation.
//!
//! Declared types are described once per build into a [`SchemaStore`], then
//! every schema-producing site (parameter, request body, response) runs the
//! ordered [`SchemaPipeline`] of transformers over its own copy. See
//! [`pipeline`] for how transformed definitions are shared between sites.

mod builder;
pub mod context;
mod document;
mod error;
pub mod pipeline;
mod registry;
pub mod schema;
mod store;
pub mod transformer;

pub use builder::{DocumentBuilder, DocumentSet, OpenApiConfig, DEFAULT_DOCUMENT_NAME};
pub use context::{
    ContextBuilder, ParameterDescriptor, PropertyDescriptor, SchemaSite, TransformContext,
};
pub use document::{
    Info, OpenApiDocument, Operation, Parameter, RequestBody, Response, OPENAPI_VERSION,
};
pub use error::{BoxError, GenerationError, OpenApiError};
pub use pipeline::SiteWalker;
pub use registry::{TypeRegistry, MAX_DEPTH};
pub use schema::{
    Discriminator, SchemaId, SchemaKind, SchemaNode, SchemaProperty, SchemaRef, COMPONENTS_PREFIX,
};
pub use store::{SchemaStore, StoreEntry};
pub use transformer::{FnTransformer, SchemaPipeline, SchemaTransformer, SyncTransformer};
