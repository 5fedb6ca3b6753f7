use apidoc_core::TypeKey;
use std::fmt;

use crate::schema::SchemaId;

/// Boxed error returned by transformer callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while describing types or transforming schemas.
#[derive(Debug)]
pub enum OpenApiError {
    /// A type could not be described (unknown type, unsupported shape,
    /// runaway nesting).
    TypeResolution { ty: TypeKey, reason: String },
    /// A registered transformer returned an error.
    Transformer {
        /// Position of the transformer in registration order.
        index: usize,
        name: String,
        ty: TypeKey,
        source: BoxError,
    },
    /// A schema reference does not resolve to a stored definition.
    ReferenceResolution { id: SchemaId },
    /// No document with this name is registered.
    UnknownDocument { name: String },
    /// Two included endpoints share a method and path.
    DuplicateOperation {
        method: String,
        path: String,
        existing: String,
    },
    /// An endpoint declares more than one request body, counting
    /// body-located parameters.
    ConflictingRequestBody { parameter: String },
}

impl fmt::Display for OpenApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenApiError::TypeResolution { ty, reason } => {
                write!(f, "Cannot describe type '{ty}': {reason}")
            }
            OpenApiError::Transformer {
                index,
                name,
                ty,
                source,
            } => {
                write!(
                    f,
                    "Schema transformer #{index} ({name}) failed on type '{ty}': {source}"
                )
            }
            OpenApiError::ReferenceResolution { id } => {
                write!(f, "Schema reference '{id}' does not resolve to a definition")
            }
            OpenApiError::UnknownDocument { name } => {
                write!(f, "No document named '{name}' is registered")
            }
            OpenApiError::DuplicateOperation {
                method,
                path,
                existing,
            } => {
                write!(
                    f,
                    "{method} {path} is already declared by operation '{existing}'"
                )
            }
            OpenApiError::ConflictingRequestBody { parameter } => {
                write!(
                    f,
                    "Body parameter '{parameter}' conflicts with another request body"
                )
            }
        }
    }
}

impl std::error::Error for OpenApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OpenApiError::Transformer { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// A failed document build.
///
/// Names the document and, when the failure happened while processing an
/// endpoint, that endpoint's operation id.
#[derive(Debug)]
pub struct GenerationError {
    pub document: String,
    pub endpoint: Option<String>,
    pub source: OpenApiError,
}

impl GenerationError {
    pub fn new(document: &str, endpoint: Option<&str>, source: OpenApiError) -> Self {
        Self {
            document: document.to_string(),
            endpoint: endpoint.map(str::to_string),
            source,
        }
    }

    /// The underlying failure.
    pub fn kind(&self) -> &OpenApiError {
        &self.source
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.endpoint {
            Some(ref endpoint) => write!(
                f,
                "Failed to generate document '{}' at endpoint '{}': {}",
                self.document, endpoint, self.source
            ),
            None => write!(
                f,
                "Failed to generate document '{}': {}",
                self.document, self.source
            ),
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
