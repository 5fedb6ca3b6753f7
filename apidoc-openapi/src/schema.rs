use apidoc_core::TypeKey;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix of component references in the rendered document.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

// ── Identifiers & references ────────────────────────────────────────────────

/// Stable identifier of a stored schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `$ref` path of this definition in the rendered document.
    pub fn ref_path(&self) -> String {
        format!("{COMPONENTS_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A schema at one site: either a reference to a stored definition or an
/// inline node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Ref(SchemaId),
    Inline(Box<SchemaNode>),
}

impl SchemaRef {
    pub fn inline(node: SchemaNode) -> Self {
        SchemaRef::Inline(Box::new(node))
    }

    /// The referenced id, if this is a reference.
    pub fn ref_id(&self) -> Option<&SchemaId> {
        match self {
            SchemaRef::Ref(id) => Some(id),
            SchemaRef::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&SchemaNode> {
        match self {
            SchemaRef::Ref(_) => None,
            SchemaRef::Inline(node) => Some(node),
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut SchemaNode> {
        match self {
            SchemaRef::Ref(_) => None,
            SchemaRef::Inline(node) => Some(node),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SchemaRef::Ref(id) => json!({ "$ref": id.ref_path() }),
            SchemaRef::Inline(node) => node.to_json(),
        }
    }
}

impl From<SchemaNode> for SchemaRef {
    fn from(node: SchemaNode) -> Self {
        SchemaRef::inline(node)
    }
}

// ── SchemaNode ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    Primitive,
    Union,
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub name: String,
    pub schema: SchemaRef,
}

/// Discriminator of a polymorphic union: the tag property and the ordered
/// mapping from tag value to variant definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: Vec<(String, SchemaId)>,
}

/// A JSON schema node.
///
/// Nodes created from a declared type carry the id of their stored
/// definition in [`SchemaNode::id`]. A transformer that mutates the node it
/// receives keeps that id; a transformer that returns a freshly built node
/// (no id, or a different one) substitutes the schema at the current site.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub id: Option<SchemaId>,
    pub declared_type: Option<TypeKey>,
    pub kind: SchemaKind,
    /// Raw JSON Schema `type` keyword.
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<SchemaProperty>,
    pub required: Vec<String>,
    pub items: Option<Box<SchemaRef>>,
    pub subschemas: Vec<SchemaRef>,
    pub discriminator: Option<Discriminator>,
    pub extensions: BTreeMap<String, Value>,
}

impl SchemaNode {
    /// An empty node of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            id: None,
            declared_type: None,
            kind,
            schema_type: None,
            format: None,
            title: None,
            description: None,
            properties: Vec::new(),
            required: Vec::new(),
            items: None,
            subschemas: Vec::new(),
            discriminator: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn object() -> Self {
        let mut node = Self::new(SchemaKind::Object);
        node.schema_type = Some("object".to_string());
        node
    }

    pub fn array(items: impl Into<SchemaRef>) -> Self {
        let mut node = Self::new(SchemaKind::Array);
        node.schema_type = Some("array".to_string());
        node.items = Some(Box::new(items.into()));
        node
    }

    pub fn primitive(schema_type: &str, format: Option<&str>) -> Self {
        let mut node = Self::new(SchemaKind::Primitive);
        node.schema_type = Some(schema_type.to_string());
        node.format = format.map(str::to_string);
        node
    }

    pub fn union(subschemas: Vec<SchemaRef>) -> Self {
        let mut node = Self::new(SchemaKind::Union);
        node.subschemas = subschemas;
        node
    }

    pub fn with_property(mut self, name: &str, schema: impl Into<SchemaRef>) -> Self {
        self.properties.push(SchemaProperty {
            name: name.to_string(),
            schema: schema.into(),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&SchemaRef> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.schema)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut SchemaRef> {
        self.properties
            .iter_mut()
            .find(|p| p.name == name)
            .map(|p| &mut p.schema)
    }

    pub fn items(&self) -> Option<&SchemaRef> {
        self.items.as_deref()
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    pub fn set_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extensions.insert(key.into(), value.into());
    }

    /// Object and union nodes are shared as component definitions.
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, SchemaKind::Object | SchemaKind::Union)
    }

    /// Whether the node still carries the identity of definition `id`.
    pub fn has_identity(&self, id: &SchemaId) -> bool {
        self.id.as_ref() == Some(id)
    }

    /// Every direct child reference, in traversal order: properties, items,
    /// subschemas.
    pub fn children(&self) -> impl Iterator<Item = &SchemaRef> {
        self.properties
            .iter()
            .map(|p| &p.schema)
            .chain(self.items.as_deref())
            .chain(self.subschemas.iter())
    }

    /// Render as a JSON Schema object in OpenAPI 3.1 form.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(ref schema_type) = self.schema_type {
            obj.insert("type".into(), json!(schema_type));
        }
        if let Some(ref format) = self.format {
            obj.insert("format".into(), json!(format));
        }
        if let Some(ref title) = self.title {
            obj.insert("title".into(), json!(title));
        }
        if let Some(ref description) = self.description {
            obj.insert("description".into(), json!(description));
        }
        if !self.properties.is_empty() {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.schema.to_json()))
                .collect();
            obj.insert("properties".into(), Value::Object(properties));
        }
        if !self.required.is_empty() {
            obj.insert("required".into(), json!(self.required));
        }
        if let Some(ref items) = self.items {
            obj.insert("items".into(), items.to_json());
        }
        if !self.subschemas.is_empty() {
            let one_of: Vec<Value> = self.subschemas.iter().map(SchemaRef::to_json).collect();
            obj.insert("oneOf".into(), Value::Array(one_of));
        }
        if let Some(ref discriminator) = self.discriminator {
            let mut rendered = Map::new();
            rendered.insert("propertyName".into(), json!(discriminator.property_name));
            if !discriminator.mapping.is_empty() {
                let mapping: Map<String, Value> = discriminator
                    .mapping
                    .iter()
                    .map(|(value, id)| (value.clone(), json!(id.ref_path())))
                    .collect();
                rendered.insert("mapping".into(), Value::Object(mapping));
            }
            obj.insert("discriminator".into(), Value::Object(rendered));
        }
        for (key, value) in &self.extensions {
            obj.insert(key.clone(), value.clone());
        }
        Value::Object(obj)
    }
}
