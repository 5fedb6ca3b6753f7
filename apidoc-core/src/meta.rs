use serde::Serialize;

use crate::types::TypeKey;

// ── Endpoint metadata ───────────────────────────────────────────────────────

/// Metadata about a single endpoint, supplied by the routing layer.
///
/// The document assembler consumes a slice of these in order; the order of
/// the slice is the order in which schema sites are visited.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub operation_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    /// Name of the document this endpoint belongs to. `None` means every
    /// document includes it.
    pub group_name: Option<String>,
    pub params: Vec<ParamInfo>,
    pub request_body: Option<RequestBodyInfo>,
    pub responses: Vec<ResponseInfo>,
}

impl EndpointInfo {
    /// Create an endpoint with no parameters, no body and no responses.
    pub fn new(method: &str, path: &str, operation_id: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_uppercase(),
            operation_id: operation_id.to_string(),
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
            group_name: None,
            params: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Restrict the endpoint to the document with the given name.
    pub fn with_group(mut self, group_name: &str) -> Self {
        self.group_name = Some(group_name.to_string());
        self
    }

    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    /// Declare a required JSON request body of the given type.
    pub fn with_request_body(mut self, ty: impl Into<TypeKey>) -> Self {
        self.request_body = Some(RequestBodyInfo {
            ty: ty.into(),
            required: true,
            content_type: "application/json".to_string(),
        });
        self
    }

    /// Declare a response for `status` carrying a body of type `ty`.
    pub fn with_response(mut self, status: u16, ty: impl Into<TypeKey>) -> Self {
        self.responses.push(ResponseInfo::new(status, Some(ty.into())));
        self
    }

    /// Declare a response for `status` without a body.
    pub fn with_empty_response(mut self, status: u16) -> Self {
        self.responses.push(ResponseInfo::new(status, None));
        self
    }

    /// Whether this endpoint is part of the document named `document_name`.
    pub fn belongs_to(&self, document_name: &str) -> bool {
        self.group_name
            .as_deref()
            .map_or(true, |group| group == document_name)
    }
}

/// Metadata about an endpoint parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub location: ParamLocation,
    pub ty: TypeKey,
    pub required: bool,
}

impl ParamInfo {
    pub fn new(name: &str, location: ParamLocation, ty: impl Into<TypeKey>) -> Self {
        Self {
            name: name.to_string(),
            location,
            ty: ty.into(),
            // Path parameters are always required.
            required: location == ParamLocation::Path,
        }
    }

    pub fn path(name: &str, ty: impl Into<TypeKey>) -> Self {
        Self::new(name, ParamLocation::Path, ty)
    }

    pub fn query(name: &str, ty: impl Into<TypeKey>) -> Self {
        Self::new(name, ParamLocation::Query, ty)
    }

    pub fn header(name: &str, ty: impl Into<TypeKey>) -> Self {
        Self::new(name, ParamLocation::Header, ty)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Where a parameter is located in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
            ParamLocation::Body => "body",
        }
    }
}

/// Request body declaration of an endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RequestBodyInfo {
    pub ty: TypeKey,
    pub required: bool,
    pub content_type: String,
}

/// One declared response of an endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseInfo {
    pub status: u16,
    pub ty: Option<TypeKey>,
    pub description: String,
}

impl ResponseInfo {
    pub fn new(status: u16, ty: Option<TypeKey>) -> Self {
        Self {
            status,
            ty,
            description: default_status_description(status).to_string(),
        }
    }
}

fn default_status_description(status: u16) -> &'static str {
    match status {
        200 => "Successful response",
        201 => "Created",
        202 => "Accepted",
        204 => "No content",
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        409 => "Conflict",
        500..=599 => "Server error",
        _ => "Response",
    }
}
