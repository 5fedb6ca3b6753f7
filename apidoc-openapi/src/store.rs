use apidoc_core::TypeKey;
use std::collections::HashMap;

use crate::context::PropertyDescriptor;
use crate::error::OpenApiError;
use crate::schema::{SchemaId, SchemaNode, SchemaRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoreKey {
    ty: TypeKey,
    /// (owning type, member name) of the containing property.
    property: Option<(TypeKey, String)>,
}

/// Result of [`SchemaStore::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEntry {
    /// The key was already known; its definition exists (or is being built).
    Occupied(SchemaId),
    /// A fresh id was reserved; the caller must [`define`](SchemaStore::define) it.
    Vacant(SchemaId),
}

impl StoreEntry {
    pub fn id(&self) -> &SchemaId {
        match self {
            StoreEntry::Occupied(id) | StoreEntry::Vacant(id) => id,
        }
    }

    pub fn into_id(self) -> SchemaId {
        match self {
            StoreEntry::Occupied(id) | StoreEntry::Vacant(id) => id,
        }
    }
}

/// Canonical schema definitions of one document build, keyed by [`SchemaId`].
///
/// Every distinct (type, containing property) pair maps to exactly one id
/// for the lifetime of the store. Definitions are drafts: the transformer
/// pipeline reads them and never writes back.
#[derive(Debug, Default)]
pub struct SchemaStore {
    nodes: HashMap<SchemaId, SchemaNode>,
    order: Vec<SchemaId>,
    keys: HashMap<StoreKey, SchemaId>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the id for `(ty, property)`, reserving a new one on first use.
    ///
    /// A reserved id immediately resolves to a placeholder object node, so a
    /// type that refers to itself finds its own id instead of recursing.
    pub fn get_or_create(
        &mut self,
        ty: &TypeKey,
        property: Option<&PropertyDescriptor>,
    ) -> StoreEntry {
        let key = StoreKey {
            ty: ty.clone(),
            property: property.map(|p| (p.parent_type.clone(), p.name.clone())),
        };
        if let Some(id) = self.keys.get(&key) {
            return StoreEntry::Occupied(id.clone());
        }

        let id = self.allocate_id(ty, property);
        let mut placeholder = SchemaNode::object();
        placeholder.id = Some(id.clone());
        placeholder.declared_type = Some(ty.clone());

        self.nodes.insert(id.clone(), placeholder);
        self.order.push(id.clone());
        self.keys.insert(key, id.clone());
        StoreEntry::Vacant(id)
    }

    /// The id already assigned to `(ty, property)`, if any.
    pub fn lookup(&self, ty: &TypeKey, property: Option<&PropertyDescriptor>) -> Option<&SchemaId> {
        let key = StoreKey {
            ty: ty.clone(),
            property: property.map(|p| (p.parent_type.clone(), p.name.clone())),
        };
        self.keys.get(&key)
    }

    /// Fill the definition of a reserved id. The node is stamped with the id.
    pub fn define(&mut self, id: &SchemaId, mut node: SchemaNode) -> Result<(), OpenApiError> {
        let slot = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| OpenApiError::ReferenceResolution { id: id.clone() })?;
        node.id = Some(id.clone());
        if node.declared_type.is_none() {
            node.declared_type = slot.declared_type.clone();
        }
        *slot = node;
        Ok(())
    }

    /// The effective schema behind `reference`: the stored definition for a
    /// reference, the node itself when inline. Follows one level only.
    pub fn resolve<'a>(&'a self, reference: &'a SchemaRef) -> Result<&'a SchemaNode, OpenApiError> {
        match reference {
            SchemaRef::Ref(id) => self
                .get(id)
                .ok_or_else(|| OpenApiError::ReferenceResolution { id: id.clone() }),
            SchemaRef::Inline(node) => Ok(node),
        }
    }

    pub fn get(&self, id: &SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &SchemaId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&SchemaId, &SchemaNode)> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|node| (id, node)))
    }

    fn allocate_id(&self, ty: &TypeKey, property: Option<&PropertyDescriptor>) -> SchemaId {
        let base = match property {
            Some(p) => format!("{}.{}", p.parent_type, p.name),
            None => ty.name().to_string(),
        };
        let mut candidate = SchemaId::new(base.clone());
        let mut n = 2;
        while self.nodes.contains_key(&candidate) {
            candidate = SchemaId::new(format!("{base}{n}"));
            n += 1;
        }
        candidate
    }
}
