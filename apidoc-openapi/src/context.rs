use apidoc_core::{ParamInfo, ParamLocation, ServiceProvider, TypeKey};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ── Descriptors ─────────────────────────────────────────────────────────────

/// The endpoint parameter a schema was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParamLocation,
    pub operation_id: String,
    pub declared_type: TypeKey,
    pub required: bool,
}

impl ParameterDescriptor {
    pub fn from_param(param: &ParamInfo, operation_id: &str) -> Self {
        Self {
            name: param.name.clone(),
            location: param.location,
            operation_id: operation_id.to_string(),
            declared_type: param.ty.clone(),
            required: param.required,
        }
    }
}

/// The member of a composite type a schema was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declared_type: TypeKey,
    pub parent_type: TypeKey,
}

/// Where a schema is rendered. At most one descriptor exists per site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSite {
    /// A top-level request or response body, or an item/variant below one.
    Body,
    /// A single endpoint parameter, including its items and variants.
    Parameter(ParameterDescriptor),
    /// A property within a composite type.
    Property(PropertyDescriptor),
}

impl SchemaSite {
    /// The site of an array item or polymorphic variant below this site.
    ///
    /// Parameter sites carry over; property sites do not.
    pub fn nested(&self) -> SchemaSite {
        match self {
            SchemaSite::Parameter(param) => SchemaSite::Parameter(param.clone()),
            SchemaSite::Body | SchemaSite::Property(_) => SchemaSite::Body,
        }
    }
}

// ── TransformContext ────────────────────────────────────────────────────────

/// Immutable snapshot handed to every transformer invocation.
///
/// Cloning is cheap: the document name and the service provider are shared.
#[derive(Debug, Clone)]
pub struct TransformContext {
    declared_type: TypeKey,
    site: SchemaSite,
    document_name: Arc<str>,
    services: Arc<ServiceProvider>,
    cancellation: CancellationToken,
}

impl TransformContext {
    /// The declared type the schema was derived from.
    pub fn declared_type(&self) -> &TypeKey {
        &self.declared_type
    }

    /// Whether the declared type is the Rust type `T` (see [`TypeKey::of`]).
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.declared_type.is::<T>()
    }

    pub fn site(&self) -> &SchemaSite {
        &self.site
    }

    /// Present only when the schema renders a single endpoint parameter.
    pub fn parameter_descriptor(&self) -> Option<&ParameterDescriptor> {
        match self.site {
            SchemaSite::Parameter(ref param) => Some(param),
            _ => None,
        }
    }

    /// Present only when the schema renders a property of a composite type.
    pub fn property_descriptor(&self) -> Option<&PropertyDescriptor> {
        match self.site {
            SchemaSite::Property(ref prop) => Some(prop),
            _ => None,
        }
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_descriptor().map(|p| p.name.as_str())
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    /// Resolve the service of type `T` registered under the document name.
    pub fn resolve_keyed_service<T: Clone + 'static>(&self) -> Option<T> {
        self.services.get_keyed::<T>(&self.document_name)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the build was asked to stop. Advisory only: the pipeline keeps
    /// invoking transformers regardless.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

// ── ContextBuilder ──────────────────────────────────────────────────────────

/// Builds [`TransformContext`]s for one document build.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    document_name: Arc<str>,
    services: Arc<ServiceProvider>,
    cancellation: CancellationToken,
}

impl ContextBuilder {
    pub fn new(
        document_name: &str,
        services: Arc<ServiceProvider>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            document_name: Arc::from(document_name),
            services,
            cancellation,
        }
    }

    /// Assemble the context for a schema of type `declared_type` rendered at `site`.
    pub fn build(&self, declared_type: &TypeKey, site: &SchemaSite) -> TransformContext {
        TransformContext {
            declared_type: declared_type.clone(),
            site: site.clone(),
            document_name: Arc::clone(&self.document_name),
            services: Arc::clone(&self.services),
            cancellation: self.cancellation.clone(),
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }
}
