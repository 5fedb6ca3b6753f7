use apidoc_core::ParamLocation;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::error::OpenApiError;
use crate::schema::{SchemaId, SchemaNode, SchemaRef};

/// OpenAPI version written by [`OpenApiDocument::to_json`].
pub const OPENAPI_VERSION: &str = "3.1.0";

#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub required: bool,
    pub content_type: String,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub description: String,
    pub schema: Option<SchemaRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: String,
    pub path: String,
    pub operation_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<u16, Response>,
}

impl Operation {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn response(&self, status: u16) -> Option<&Response> {
        self.responses.get(&status)
    }

    fn to_json(&self) -> Value {
        let mut operation = Map::new();
        operation.insert("operationId".into(), json!(self.operation_id));
        if !self.tags.is_empty() {
            operation.insert("tags".into(), json!(self.tags));
        }
        if let Some(ref summary) = self.summary {
            operation.insert("summary".into(), json!(summary));
        }
        if let Some(ref description) = self.description {
            operation.insert("description".into(), json!(description));
        }
        if self.deprecated {
            operation.insert("deprecated".into(), json!(true));
        }

        let params: Vec<Value> = self
            .parameters
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "in": p.location.as_str(),
                    "required": p.required,
                    "schema": p.schema.to_json(),
                })
            })
            .collect();
        if !params.is_empty() {
            operation.insert("parameters".into(), json!(params));
        }

        if let Some(ref body) = self.request_body {
            let mut content = Map::new();
            content.insert(
                body.content_type.clone(),
                json!({ "schema": body.schema.to_json() }),
            );
            operation.insert(
                "requestBody".into(),
                json!({ "required": body.required, "content": content }),
            );
        }

        let mut responses = Map::new();
        for (status, response) in &self.responses {
            let mut entry = Map::new();
            entry.insert("description".into(), json!(response.description));
            if let Some(ref schema) = response.schema {
                entry.insert(
                    "content".into(),
                    json!({ "application/json": { "schema": schema.to_json() } }),
                );
            }
            responses.insert(status.to_string(), Value::Object(entry));
        }
        operation.insert("responses".into(), Value::Object(responses));

        Value::Object(operation)
    }
}

/// A generated API description.
///
/// Immutable once returned by the builder. Schema references held by
/// operations resolve through [`OpenApiDocument::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiDocument {
    pub document_name: String,
    pub info: Info,
    /// path → lowercase method → operation
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
    pub components: BTreeMap<SchemaId, SchemaNode>,
}

impl OpenApiDocument {
    pub fn operation(&self, method: &str, path: &str) -> Option<&Operation> {
        self.paths
            .get(path)
            .and_then(|ops| ops.get(&method.to_lowercase()))
    }

    /// Find an operation by its operation id.
    pub fn operation_by_id(&self, operation_id: &str) -> Option<&Operation> {
        self.operations().find(|op| op.operation_id == operation_id)
    }

    /// Every operation, ordered by path then method.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(|ops| ops.values())
    }

    pub fn component(&self, id: &SchemaId) -> Option<&SchemaNode> {
        self.components.get(id)
    }

    /// The effective schema behind `reference`.
    pub fn resolve<'a>(&'a self, reference: &'a SchemaRef) -> Result<&'a SchemaNode, OpenApiError> {
        match reference {
            SchemaRef::Ref(id) => self
                .components
                .get(id)
                .ok_or_else(|| OpenApiError::ReferenceResolution { id: id.clone() }),
            SchemaRef::Inline(node) => Ok(node),
        }
    }

    /// Render as an OpenAPI 3.1.0 JSON value.
    pub fn to_json(&self) -> Value {
        let mut info = Map::new();
        info.insert("title".into(), json!(self.info.title));
        info.insert("version".into(), json!(self.info.version));
        if let Some(ref desc) = self.info.description {
            info.insert("description".into(), json!(desc));
        }

        let mut paths = Map::new();
        for (path, operations) in &self.paths {
            let item: Map<String, Value> = operations
                .iter()
                .map(|(method, op)| (method.clone(), op.to_json()))
                .collect();
            paths.insert(path.clone(), Value::Object(item));
        }

        let mut root = Map::new();
        root.insert("openapi".into(), json!(OPENAPI_VERSION));
        root.insert("info".into(), Value::Object(info));
        root.insert("paths".into(), Value::Object(paths));
        if !self.components.is_empty() {
            let schemas: Map<String, Value> = self
                .components
                .iter()
                .map(|(id, node)| (id.to_string(), node.to_json()))
                .collect();
            root.insert("components".into(), json!({ "schemas": schemas }));
        }
        Value::Object(root)
    }
}
