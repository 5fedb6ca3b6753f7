use futures_util::future::{self, BoxFuture};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::context::TransformContext;
use crate::error::{BoxError, OpenApiError};
use crate::schema::SchemaNode;

/// A registered schema transformation.
///
/// `transform` receives the current schema by value and returns the schema
/// to hand to the next transformer. Returning the same node (mutated or not)
/// keeps its identity; returning a different node substitutes the schema at
/// the current site.
///
/// # Example
///
/// ```ignore
/// struct Int64AsString;
///
/// impl SchemaTransformer for Int64AsString {
///     fn transform<'a>(
///         &'a self,
///         mut schema: SchemaNode,
///         ctx: &'a TransformContext,
///     ) -> BoxFuture<'a, Result<SchemaNode, BoxError>> {
///         Box::pin(async move {
///             if ctx.is::<i64>() {
///                 schema.schema_type = Some("string".into());
///             }
///             Ok(schema)
///         })
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `SchemaTransformer`",
    label = "this type cannot be registered as a schema transformer",
    note = "implement `SchemaTransformer`, or register a closure with `register_fn` / `register_sync`"
)]
pub trait SchemaTransformer: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn transform<'a>(
        &'a self,
        schema: SchemaNode,
        ctx: &'a TransformContext,
    ) -> BoxFuture<'a, Result<SchemaNode, BoxError>>;
}

// ── Closure adapters ────────────────────────────────────────────────────────

/// Async closure transformer, called as `f(schema, context, cancellation)`.
pub struct FnTransformer<F> {
    name: String,
    f: F,
}

impl<F> FnTransformer<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> SchemaTransformer for FnTransformer<F>
where
    F: Fn(SchemaNode, TransformContext, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SchemaNode, BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform<'a>(
        &'a self,
        schema: SchemaNode,
        ctx: &'a TransformContext,
    ) -> BoxFuture<'a, Result<SchemaNode, BoxError>> {
        let token = ctx.cancellation_token().clone();
        Box::pin((self.f)(schema, ctx.clone(), token))
    }
}

/// Synchronous closure transformer that edits the schema in place.
pub struct SyncTransformer<F> {
    name: String,
    f: F,
}

impl<F> SyncTransformer<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SchemaTransformer for SyncTransformer<F>
where
    F: Fn(&mut SchemaNode, &TransformContext) -> Result<(), BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform<'a>(
        &'a self,
        mut schema: SchemaNode,
        ctx: &'a TransformContext,
    ) -> BoxFuture<'a, Result<SchemaNode, BoxError>> {
        let result = (self.f)(&mut schema, ctx).map(|()| schema);
        Box::pin(future::ready(result))
    }
}

// ── SchemaPipeline ──────────────────────────────────────────────────────────

/// Ordered list of schema transformers. Registration order is execution order.
#[derive(Clone, Default)]
pub struct SchemaPipeline {
    transformers: Vec<Arc<dyn SchemaTransformer>>,
}

impl SchemaPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transformer.
    pub fn register<T: SchemaTransformer + 'static>(&mut self, transformer: T) -> &mut Self {
        self.transformers.push(Arc::new(transformer));
        self
    }

    /// Append an async closure called as `f(schema, context, cancellation)`.
    pub fn register_fn<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(SchemaNode, TransformContext, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SchemaNode, BoxError>> + Send + 'static,
    {
        let name = format!("fn#{}", self.transformers.len());
        self.register(FnTransformer::new(name, f))
    }

    /// Append a synchronous closure editing the schema in place.
    pub fn register_sync<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut SchemaNode, &TransformContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let name = format!("sync#{}", self.transformers.len());
        self.register(SyncTransformer::new(name, f))
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Transformer names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Run every transformer, in registration order, on one schema node.
    ///
    /// Each transformer receives the previous one's output. The first error
    /// stops the remaining transformers for this node. Cancellation is not
    /// checked here; transformers read it from the context.
    pub async fn apply(
        &self,
        mut schema: SchemaNode,
        ctx: &TransformContext,
    ) -> Result<SchemaNode, OpenApiError> {
        for (index, transformer) in self.transformers.iter().enumerate() {
            tracing::trace!(
                index,
                transformer = transformer.name(),
                ty = %ctx.declared_type(),
                "Applying schema transformer"
            );
            schema = transformer.transform(schema, ctx).await.map_err(|source| {
                OpenApiError::Transformer {
                    index,
                    name: transformer.name().to_string(),
                    ty: ctx.declared_type().clone(),
                    source,
                }
            })?;
        }
        Ok(schema)
    }
}
