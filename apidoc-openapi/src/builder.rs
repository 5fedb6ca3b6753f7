use apidoc_core::{
    ApidocConfig, ConfigError, EndpointInfo, ParamLocation, ServiceProvider, TypeCatalog,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::{ContextBuilder, ParameterDescriptor, SchemaSite, TransformContext};
use crate::document::{Info, OpenApiDocument, Operation, Parameter, RequestBody, Response};
use crate::error::{BoxError, GenerationError, OpenApiError};
use crate::pipeline::SiteWalker;
use crate::registry::TypeRegistry;
use crate::schema::{SchemaId, SchemaNode};
use crate::store::SchemaStore;
use crate::transformer::{SchemaPipeline, SchemaTransformer};

/// Name of the document built when none is configured.
pub const DEFAULT_DOCUMENT_NAME: &str = "v1";

/// Configuration for one generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Document identity: selects grouped endpoints and keyed services.
    pub document_name: String,
}

impl OpenApiConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_document_name(mut self, name: &str) -> Self {
        self.document_name = name.to_string();
        self
    }

    /// Read the configuration of document `document_name`.
    ///
    /// Each key is looked up under `openapi.documents.<name>.` first, then
    /// under `openapi.`. `title` is required; `version` defaults to `1.0.0`.
    pub fn from_config(config: &ApidocConfig, document_name: &str) -> Result<Self, ConfigError> {
        let lookup = |field: &str| -> Result<Option<String>, ConfigError> {
            let scoped = format!("openapi.documents.{document_name}.{field}");
            match config.get_opt::<String>(&scoped)? {
                Some(value) => Ok(Some(value)),
                None => config.get_opt::<String>(&format!("openapi.{field}")),
            }
        };
        let title = lookup("title")?.ok_or_else(|| ConfigError::NotFound("openapi.title".to_string()))?;
        let version = lookup("version")?.unwrap_or_else(|| "1.0.0".to_string());
        Ok(Self {
            title,
            version,
            description: lookup("description")?,
            document_name: document_name.to_string(),
        })
    }
}

type EndpointFilter = Arc<dyn Fn(&EndpointInfo) -> bool + Send + Sync>;

/// Schema ids described for one endpoint during the first build phase.
struct EndpointSchemas {
    params: Vec<SchemaId>,
    request_body: Option<SchemaId>,
    responses: Vec<Option<SchemaId>>,
}

// ── DocumentBuilder ─────────────────────────────────────────────────────────

/// Assembles an [`OpenApiDocument`] from endpoint metadata.
///
/// # Example
///
/// ```ignore
/// let builder = DocumentBuilder::new(OpenApiConfig::new("Shop", "1.0.0"), Arc::new(types))
///     .with_sync_transformer(|schema, ctx| {
///         if ctx.is::<i32>() {
///             schema.format = Some("int32".into());
///         }
///         Ok(())
///     });
/// let document = builder.build(&endpoints, CancellationToken::new()).await?;
/// ```
#[derive(Clone)]
pub struct DocumentBuilder {
    config: OpenApiConfig,
    registry: TypeRegistry,
    pipeline: SchemaPipeline,
    services: Arc<ServiceProvider>,
    filter: Option<EndpointFilter>,
}

impl DocumentBuilder {
    pub fn new(config: OpenApiConfig, catalog: Arc<dyn TypeCatalog>) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(catalog),
            pipeline: SchemaPipeline::new(),
            services: Arc::new(ServiceProvider::empty()),
            filter: None,
        }
    }

    /// Services exposed to transformers through their context.
    pub fn with_services(mut self, services: impl Into<Arc<ServiceProvider>>) -> Self {
        self.services = services.into();
        self
    }

    pub fn with_pipeline(mut self, pipeline: SchemaPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_transformer<T: SchemaTransformer + 'static>(mut self, transformer: T) -> Self {
        self.pipeline.register(transformer);
        self
    }

    pub fn with_fn_transformer<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(SchemaNode, TransformContext, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SchemaNode, BoxError>> + Send + 'static,
    {
        self.pipeline.register_fn(f);
        self
    }

    pub fn with_sync_transformer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SchemaNode, &TransformContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.pipeline.register_sync(f);
        self
    }

    /// Only include endpoints for which `filter` returns `true`.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&EndpointInfo) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn config(&self) -> &OpenApiConfig {
        &self.config
    }

    pub fn document_name(&self) -> &str {
        &self.config.document_name
    }

    pub fn pipeline(&self) -> &SchemaPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut SchemaPipeline {
        &mut self.pipeline
    }

    /// Whether `endpoint` is part of this document.
    pub fn includes(&self, endpoint: &EndpointInfo) -> bool {
        endpoint.belongs_to(&self.config.document_name)
            && self.filter.as_ref().map_or(true, |f| f(endpoint))
    }

    /// Build the document.
    ///
    /// Types are described first, for every included endpoint, into a store
    /// owned by this call. Then each site runs through the transformer
    /// pipeline: every parameter, the request body, and every response, in
    /// endpoint order. The first error aborts the build.
    pub async fn build(
        &self,
        endpoints: &[EndpointInfo],
        cancellation: CancellationToken,
    ) -> Result<OpenApiDocument, GenerationError> {
        let included: Vec<&EndpointInfo> = endpoints.iter().filter(|e| self.includes(e)).collect();
        debug!(
            document = %self.config.document_name,
            endpoints = included.len(),
            skipped = endpoints.len() - included.len(),
            "Building OpenAPI document"
        );

        let mut store = SchemaStore::new();
        let mut described = Vec::with_capacity(included.len());
        for &endpoint in &included {
            let schemas = self
                .describe_endpoint(&mut store, endpoint)
                .map_err(|e| self.fail(Some(endpoint), e))?;
            described.push(schemas);
        }

        let contexts = ContextBuilder::new(
            &self.config.document_name,
            Arc::clone(&self.services),
            cancellation,
        );
        let mut walker = SiteWalker::new(&store, &self.pipeline, &contexts);
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
        for (&endpoint, schemas) in included.iter().zip(described) {
            let method = endpoint.method.to_lowercase();
            if let Some(existing) = paths.get(&endpoint.path).and_then(|ops| ops.get(&method)) {
                let error = OpenApiError::DuplicateOperation {
                    method: endpoint.method.to_uppercase(),
                    path: endpoint.path.clone(),
                    existing: existing.operation_id.clone(),
                };
                return Err(self.fail(Some(endpoint), error));
            }
            let operation = self
                .assemble_operation(&mut walker, endpoint, schemas)
                .await
                .map_err(|e| self.fail(Some(endpoint), e))?;
            paths
                .entry(endpoint.path.clone())
                .or_default()
                .insert(method, operation);
        }

        let nodes_transformed = walker.nodes_transformed();
        let components = walker.into_components();
        info!(
            document = %self.config.document_name,
            operations = included.len(),
            definitions = store.len(),
            components = components.len(),
            nodes_transformed,
            "OpenAPI document built"
        );

        Ok(OpenApiDocument {
            document_name: self.config.document_name.clone(),
            info: Info {
                title: self.config.title.clone(),
                version: self.config.version.clone(),
                description: self.config.description.clone(),
            },
            paths,
            components,
        })
    }

    fn describe_endpoint(
        &self,
        store: &mut SchemaStore,
        endpoint: &EndpointInfo,
    ) -> Result<EndpointSchemas, OpenApiError> {
        // A body-located parameter renders as the request body.
        let allowed = if endpoint.request_body.is_some() { 0 } else { 1 };
        if let Some(extra) = endpoint
            .params
            .iter()
            .filter(|p| p.location == ParamLocation::Body)
            .nth(allowed)
        {
            return Err(OpenApiError::ConflictingRequestBody {
                parameter: extra.name.clone(),
            });
        }

        let params = endpoint
            .params
            .iter()
            .map(|param| self.registry.describe_parameter(store, param))
            .collect::<Result<Vec<_>, _>>()?;
        let request_body = endpoint
            .request_body
            .as_ref()
            .map(|body| self.registry.describe(store, &body.ty))
            .transpose()?;
        let responses = endpoint
            .responses
            .iter()
            .map(|response| {
                response
                    .ty
                    .as_ref()
                    .map(|ty| self.registry.describe(store, ty))
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EndpointSchemas {
            params,
            request_body,
            responses,
        })
    }

    async fn assemble_operation(
        &self,
        walker: &mut SiteWalker<'_>,
        endpoint: &EndpointInfo,
        schemas: EndpointSchemas,
    ) -> Result<Operation, OpenApiError> {
        let mut parameters = Vec::with_capacity(endpoint.params.len());
        let mut body_param = None;
        for (param, id) in endpoint.params.iter().zip(&schemas.params) {
            let descriptor = ParameterDescriptor::from_param(param, &endpoint.operation_id);
            let schema = walker
                .transform_site(id, SchemaSite::Parameter(descriptor))
                .await?;
            if param.location == ParamLocation::Body {
                body_param = Some(RequestBody {
                    required: param.required,
                    content_type: "application/json".to_string(),
                    schema,
                });
                continue;
            }
            parameters.push(Parameter {
                name: param.name.clone(),
                location: param.location,
                required: param.required,
                schema,
            });
        }

        let request_body = match (&endpoint.request_body, &schemas.request_body) {
            (Some(body), Some(id)) => Some(RequestBody {
                required: body.required,
                content_type: body.content_type.clone(),
                schema: walker.transform_site(id, SchemaSite::Body).await?,
            }),
            _ => body_param,
        };

        let mut responses = BTreeMap::new();
        for (response, id) in endpoint.responses.iter().zip(&schemas.responses) {
            let schema = match id {
                Some(id) => Some(walker.transform_site(id, SchemaSite::Body).await?),
                None => None,
            };
            responses.insert(
                response.status,
                Response {
                    description: response.description.clone(),
                    schema,
                },
            );
        }

        Ok(Operation {
            method: endpoint.method.clone(),
            path: endpoint.path.clone(),
            operation_id: endpoint.operation_id.clone(),
            summary: endpoint.summary.clone(),
            description: endpoint.description.clone(),
            tags: endpoint.tags.clone(),
            deprecated: endpoint.deprecated,
            parameters,
            request_body,
            responses,
        })
    }

    fn fail(&self, endpoint: Option<&EndpointInfo>, error: OpenApiError) -> GenerationError {
        let operation_id = endpoint.map(|e| e.operation_id.as_str());
        warn!(
            document = %self.config.document_name,
            endpoint = operation_id.unwrap_or("-"),
            error = %error,
            "OpenAPI document generation failed"
        );
        GenerationError::new(&self.config.document_name, operation_id, error)
    }
}

// ── DocumentSet ─────────────────────────────────────────────────────────────

/// Several named documents generated from the same endpoints.
///
/// Each build owns its schema store, so documents never share definitions.
#[derive(Clone, Default)]
pub struct DocumentSet {
    builders: Vec<DocumentBuilder>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous one with the same name.
    pub fn add(mut self, builder: DocumentBuilder) -> Self {
        self.builders
            .retain(|b| b.document_name() != builder.document_name());
        self.builders.push(builder);
        self
    }

    pub fn get(&self, document_name: &str) -> Option<&DocumentBuilder> {
        self.builders
            .iter()
            .find(|b| b.document_name() == document_name)
    }

    /// Document names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.builders.iter().map(|b| b.document_name()).collect()
    }

    /// Build the document named `document_name`.
    pub async fn build(
        &self,
        document_name: &str,
        endpoints: &[EndpointInfo],
        cancellation: CancellationToken,
    ) -> Result<OpenApiDocument, GenerationError> {
        match self.get(document_name) {
            Some(builder) => builder.build(endpoints, cancellation).await,
            None => Err(GenerationError::new(
                document_name,
                None,
                OpenApiError::UnknownDocument {
                    name: document_name.to_string(),
                },
            )),
        }
    }

    /// Build every document, one after the other.
    pub async fn build_all(
        &self,
        endpoints: &[EndpointInfo],
        cancellation: CancellationToken,
    ) -> Result<BTreeMap<String, OpenApiDocument>, GenerationError> {
        let mut documents = BTreeMap::new();
        for builder in &self.builders {
            let document = builder.build(endpoints, cancellation.clone()).await?;
            documents.insert(builder.document_name().to_string(), document);
        }
        Ok(documents)
    }
}
