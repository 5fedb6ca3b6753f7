use apidoc_core::{ParamInfo, PropertyShape, TypeCatalog, TypeKey, TypeShape};
use std::sync::Arc;

use crate::context::PropertyDescriptor;
use crate::error::OpenApiError;
use crate::schema::{Discriminator, SchemaId, SchemaNode, SchemaProperty, SchemaRef};
use crate::store::{SchemaStore, StoreEntry};

/// Deepest chain of distinct nested types [`TypeRegistry`] will follow.
pub const MAX_DEPTH: usize = 64;

/// Turns declared types into schema definitions in a [`SchemaStore`].
///
/// Object and polymorphic types are keyed by type alone, so one definition
/// serves every site using the type. Primitives and arrays are keyed by
/// (type, containing property), giving each property its own node.
#[derive(Clone)]
pub struct TypeRegistry {
    catalog: Arc<dyn TypeCatalog>,
}

impl TypeRegistry {
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// Describe a root type (request body, response body, array item).
    pub fn describe(&self, store: &mut SchemaStore, ty: &TypeKey) -> Result<SchemaId, OpenApiError> {
        self.describe_at(store, ty, None, 0)
    }

    /// Describe the declared type of an endpoint parameter.
    pub fn describe_parameter(
        &self,
        store: &mut SchemaStore,
        param: &ParamInfo,
    ) -> Result<SchemaId, OpenApiError> {
        self.describe_at(store, &param.ty, None, 0)
    }

    fn describe_at(
        &self,
        store: &mut SchemaStore,
        ty: &TypeKey,
        property: Option<&PropertyDescriptor>,
        depth: usize,
    ) -> Result<SchemaId, OpenApiError> {
        if depth > MAX_DEPTH {
            return Err(OpenApiError::TypeResolution {
                ty: ty.clone(),
                reason: format!("nesting deeper than {MAX_DEPTH} levels"),
            });
        }
        let shape = self
            .catalog
            .shape(ty)
            .ok_or_else(|| OpenApiError::TypeResolution {
                ty: ty.clone(),
                reason: "type is not registered in the catalog".to_string(),
            })?;

        let property = if shape.is_composite() { None } else { property };
        let id = match store.get_or_create(ty, property) {
            StoreEntry::Occupied(id) => return Ok(id),
            StoreEntry::Vacant(id) => id,
        };

        let mut node = match shape {
            TypeShape::Primitive(primitive) => {
                SchemaNode::primitive(primitive.schema_type(), primitive.format())
            }
            TypeShape::Array { element } => {
                let items = self.describe_at(store, &element, None, depth + 1)?;
                SchemaNode::array(SchemaRef::Ref(items))
            }
            TypeShape::Object { properties } => {
                let mut node = SchemaNode::object();
                self.describe_properties(store, ty, &properties, &mut node, depth)?;
                node
            }
            TypeShape::Polymorphic {
                discriminator_property,
                properties,
                variants,
            } => {
                let mut subschemas = Vec::with_capacity(variants.len());
                let mut mapping = Vec::with_capacity(variants.len());
                for variant in &variants {
                    let variant_id = self.describe_at(store, &variant.ty, None, depth + 1)?;
                    mapping.push((variant.discriminator.clone(), variant_id.clone()));
                    subschemas.push(SchemaRef::Ref(variant_id));
                }
                let mut node = SchemaNode::union(subschemas);
                node.discriminator = Some(Discriminator {
                    property_name: discriminator_property,
                    mapping,
                });
                self.describe_properties(store, ty, &properties, &mut node, depth)?;
                node
            }
        };
        node.declared_type = Some(ty.clone());
        store.define(&id, node)?;
        tracing::trace!(ty = %ty, id = %id, "Described type");
        Ok(id)
    }

    fn describe_properties(
        &self,
        store: &mut SchemaStore,
        owner: &TypeKey,
        properties: &[PropertyShape],
        node: &mut SchemaNode,
        depth: usize,
    ) -> Result<(), OpenApiError> {
        for prop in properties {
            let descriptor = PropertyDescriptor {
                name: prop.name.clone(),
                declared_type: prop.ty.clone(),
                parent_type: owner.clone(),
            };
            let child = self.describe_at(store, &prop.ty, Some(&descriptor), depth + 1)?;
            node.properties.push(SchemaProperty {
                name: prop.name.clone(),
                schema: SchemaRef::Ref(child),
            });
            if prop.required {
                node.required.push(prop.name.clone());
            }
        }
        Ok(())
    }
}
