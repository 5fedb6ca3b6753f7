//! Per-site traversal of the schema graph.
//!
//! A [`SiteWalker`] runs the [`SchemaPipeline`] once for every place a
//! schema is rendered. Each site transforms its own copy of the stored
//! draft, top-level node first, then properties in declaration order, then
//! `items`, then `subschemas`.
//!
//! Composite nodes that keep their identity are interned into the shared
//! component table: the first body or property site defines the component,
//! later sites whose node is identical share the reference, and later sites
//! whose node differs keep an inline copy. Parameter sites only share an
//! existing component, so a parameter-specific edit never becomes the shared
//! definition. A recursive type first reached from a parameter is defined
//! from a separate body pass over its draft. Drafts in the [`SchemaStore`]
//! are never written to.
//!
//! Every reference a walker hands out resolves against its components,
//! including discriminator mapping targets.

use apidoc_core::TypeKey;
use futures_util::future::BoxFuture;
use std::collections::{BTreeMap, HashSet};

use crate::context::{ContextBuilder, PropertyDescriptor, SchemaSite};
use crate::error::OpenApiError;
use crate::schema::{SchemaId, SchemaNode, SchemaProperty, SchemaRef};
use crate::store::SchemaStore;
use crate::transformer::SchemaPipeline;

pub struct SiteWalker<'s> {
    store: &'s SchemaStore,
    pipeline: &'s SchemaPipeline,
    contexts: &'s ContextBuilder,
    components: BTreeMap<SchemaId, SchemaNode>,
    /// Definitions being transformed on the current path, for recursive types.
    path: Vec<SchemaId>,
    recursive: HashSet<SchemaId>,
    nodes_transformed: usize,
}

impl<'s> SiteWalker<'s> {
    pub fn new(
        store: &'s SchemaStore,
        pipeline: &'s SchemaPipeline,
        contexts: &'s ContextBuilder,
    ) -> Self {
        Self {
            store,
            pipeline,
            contexts,
            components: BTreeMap::new(),
            path: Vec::new(),
            recursive: HashSet::new(),
            nodes_transformed: 0,
        }
    }

    /// Transform the schema rendered at one site and return what the site
    /// should hold: a component reference or an inline node.
    pub async fn transform_site(
        &mut self,
        id: &SchemaId,
        site: SchemaSite,
    ) -> Result<SchemaRef, OpenApiError> {
        let owner = self
            .store
            .get(id)
            .and_then(|node| node.declared_type.clone())
            .unwrap_or_else(|| TypeKey::new(id.as_str()));
        self.visit(SchemaRef::Ref(id.clone()), site, owner).await
    }

    /// Number of nodes the pipeline ran on so far.
    pub fn nodes_transformed(&self) -> usize {
        self.nodes_transformed
    }

    pub fn components(&self) -> &BTreeMap<SchemaId, SchemaNode> {
        &self.components
    }

    pub fn into_components(self) -> BTreeMap<SchemaId, SchemaNode> {
        self.components
    }

    fn visit<'a>(
        &'a mut self,
        reference: SchemaRef,
        site: SchemaSite,
        owner: TypeKey,
    ) -> BoxFuture<'a, Result<SchemaRef, OpenApiError>> {
        Box::pin(async move {
            let id = match reference {
                // Transformer output: descend, but do not transform again.
                SchemaRef::Inline(node) => {
                    let node = self.visit_children(*node, site, owner).await?;
                    return Ok(SchemaRef::inline(node));
                }
                SchemaRef::Ref(id) => id,
            };
            if self.path.contains(&id) {
                self.recursive.insert(id.clone());
                return Ok(SchemaRef::Ref(id));
            }

            let store = self.store;
            let draft = store
                .get(&id)
                .ok_or_else(|| OpenApiError::ReferenceResolution { id: id.clone() })?;
            let declared_type = draft.declared_type.clone().unwrap_or(owner);
            let ctx = self.contexts.build(&declared_type, &site);
            let node = self.pipeline.apply(draft.clone(), &ctx).await?;
            self.nodes_transformed += 1;

            let defines = !matches!(site, SchemaSite::Parameter(_));
            self.path.push(id.clone());
            let node = self.visit_children(node, site, declared_type.clone()).await;
            self.path.pop();
            let node = node?;

            if !defines && self.recursive.contains(&id) && !self.components.contains_key(&id) {
                // Inner self-references need a definition without parameter edits.
                self.visit(SchemaRef::Ref(id.clone()), SchemaSite::Body, declared_type)
                    .await?;
            }
            Ok(self.intern(id, node, defines))
        })
    }

    fn visit_children<'a>(
        &'a mut self,
        mut node: SchemaNode,
        site: SchemaSite,
        owner: TypeKey,
    ) -> BoxFuture<'a, Result<SchemaNode, OpenApiError>> {
        Box::pin(async move {
            let owner = node.declared_type.clone().unwrap_or(owner);

            let properties = std::mem::take(&mut node.properties);
            for prop in properties {
                let declared_type = self.declared_type_of(&prop.schema, &owner);
                let prop_site = SchemaSite::Property(PropertyDescriptor {
                    name: prop.name.clone(),
                    declared_type,
                    parent_type: owner.clone(),
                });
                let schema = self.visit(prop.schema, prop_site, owner.clone()).await?;
                node.properties.push(SchemaProperty {
                    name: prop.name,
                    schema,
                });
            }

            if let Some(items) = node.items.take() {
                let items = self.visit(*items, site.nested(), owner.clone()).await?;
                node.items = Some(Box::new(items));
            }

            let subschemas = std::mem::take(&mut node.subschemas);
            for sub in subschemas {
                let sub = self.visit(sub, site.nested(), owner.clone()).await?;
                node.subschemas.push(sub);
            }
            self.retain_defined_mapping(&mut node);

            Ok(node)
        })
    }

    fn declared_type_of(&self, reference: &SchemaRef, owner: &TypeKey) -> TypeKey {
        let declared = match reference {
            SchemaRef::Ref(id) => self.store.get(id).and_then(|n| n.declared_type.clone()),
            SchemaRef::Inline(node) => node.declared_type.clone(),
        };
        declared.unwrap_or_else(|| owner.clone())
    }

    /// Drop discriminator entries whose variant is not a component reference
    /// at this site, e.g. an inline parameter variant or a substituted one.
    fn retain_defined_mapping(&self, node: &mut SchemaNode) {
        let Some(discriminator) = node.discriminator.as_mut() else {
            return;
        };
        let referenced: HashSet<&SchemaId> = node
            .subschemas
            .iter()
            .filter_map(SchemaRef::ref_id)
            .filter(|id| self.components.contains_key(*id) || self.path.contains(*id))
            .collect();
        let before = discriminator.mapping.len();
        discriminator.mapping.retain(|(_, id)| referenced.contains(id));
        if discriminator.mapping.len() != before {
            tracing::debug!(
                dropped = before - discriminator.mapping.len(),
                "Discriminator mapping narrowed to defined variants"
            );
        }
    }

    fn intern(&mut self, id: SchemaId, node: SchemaNode, defines: bool) -> SchemaRef {
        let shared = node.has_identity(&id) && node.is_composite();
        if !shared {
            // Substituted, primitive or array: the site keeps its own copy.
            // A recursive type still needs a definition for its inner references.
            if self.recursive.contains(&id) && !self.components.contains_key(&id) {
                self.components.insert(id, node.clone());
            }
            return SchemaRef::inline(node);
        }

        match self.components.get(&id) {
            None if !defines => SchemaRef::inline(node),
            None => {
                self.components.insert(id.clone(), node);
                SchemaRef::Ref(id)
            }
            Some(existing) if *existing == node => SchemaRef::Ref(id),
            Some(_) => {
                tracing::debug!(id = %id, "Schema diverges from its shared definition at this site");
                SchemaRef::inline(node)
            }
        }
    }
}
