//! apidoc: OpenAPI documents from endpoint metadata, shaped by an ordered
//! pipeline of schema transformers.
//!
//! This facade crate re-exports the apidoc sub-crates through a single
//! dependency. Import everything you need with:
//!
//! ```ignore
//! use apidoc::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate            |
//! |-----------|---------|------------------|
//! | `openapi` | **yes** | `apidoc-openapi` |

pub extern crate apidoc_core;

// Re-export everything from apidoc-core at the top level for convenience.
pub use apidoc_core::*;

#[cfg(feature = "openapi")]
pub use apidoc_openapi;

/// Unified prelude: `use apidoc::prelude::*`.
pub mod prelude {
    pub use apidoc_core::{
        init_tracing, ApidocConfig, EndpointInfo, ParamInfo, ParamLocation, ServiceProvider,
        ServiceRegistry, TypeCatalog, TypeKey, TypeSet,
    };
    pub use tokio_util::sync::CancellationToken;

    #[cfg(feature = "openapi")]
    pub use apidoc_openapi::{
        BoxError, DocumentBuilder, DocumentSet, GenerationError, OpenApiConfig, OpenApiDocument,
        OpenApiError, SchemaNode, SchemaRef, SchemaTransformer, TransformContext,
    };
}
