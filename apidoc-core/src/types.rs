//! Declared types and their shapes.
//!
//! The reflection layer that derives a shape from a native type is outside
//! this crate. It hands shapes over through [`TypeCatalog`]; [`TypeSet`] is
//! the in-memory catalog applications fill by hand.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// ── TypeKey ─────────────────────────────────────────────────────────────────

/// Stable name of a declared type, e.g. `"int"`, `"User"`, `"User[]"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Key of a Rust type.
    ///
    /// Primitives map to the built-in names registered by
    /// [`TypeSet::with_primitives`]; every other type maps to its type name
    /// with module paths stripped (`my_app::models::User` becomes `User`).
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<T>();
        let builtin = match full {
            "bool" => Some("bool"),
            "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => Some("int"),
            "i64" | "u64" | "isize" | "usize" => Some("long"),
            "f32" => Some("float"),
            "f64" => Some("double"),
            "str" | "&str" | "alloc::string::String" | "char" => Some("string"),
            _ => None,
        };
        match builtin {
            Some(name) => Self::new(name),
            None => Self::new(short_type_name(full)),
        }
    }

    /// Key used for a sequence of `element`.
    pub fn array_of(element: &TypeKey) -> Self {
        Self(format!("{}[]", element.0))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Capability check against a Rust type, see [`TypeKey::of`].
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        *self == Self::of::<T>()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&TypeKey> for TypeKey {
    fn from(key: &TypeKey) -> Self {
        key.clone()
    }
}

/// Strip module paths from every segment of a (possibly generic) type name.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        match c {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
    out
}

// ── Shapes ──────────────────────────────────────────────────────────────────

/// Built-in primitive types with their JSON Schema type and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    String,
    Uuid,
    DateTime,
    Date,
    Binary,
}

impl PrimitiveType {
    /// The JSON Schema `type` keyword.
    pub fn schema_type(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Int32 | PrimitiveType::Int64 => "integer",
            PrimitiveType::Float | PrimitiveType::Double => "number",
            PrimitiveType::String
            | PrimitiveType::Uuid
            | PrimitiveType::DateTime
            | PrimitiveType::Date
            | PrimitiveType::Binary => "string",
        }
    }

    /// The OpenAPI `format` keyword, if any.
    pub fn format(&self) -> Option<&'static str> {
        match self {
            PrimitiveType::Boolean | PrimitiveType::String => None,
            PrimitiveType::Int32 => Some("int32"),
            PrimitiveType::Int64 => Some("int64"),
            PrimitiveType::Float => Some("float"),
            PrimitiveType::Double => Some("double"),
            PrimitiveType::Uuid => Some("uuid"),
            PrimitiveType::DateTime => Some("date-time"),
            PrimitiveType::Date => Some("date"),
            PrimitiveType::Binary => Some("binary"),
        }
    }
}

/// A member of an object type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyShape {
    pub name: String,
    pub ty: TypeKey,
    pub required: bool,
}

/// A derived variant of a polymorphic base type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantShape {
    pub discriminator: String,
    pub ty: TypeKey,
}

/// The structure of a declared type as reported by the reflection layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeShape {
    Primitive(PrimitiveType),
    Object {
        properties: Vec<PropertyShape>,
    },
    Array {
        element: TypeKey,
    },
    Polymorphic {
        discriminator_property: String,
        properties: Vec<PropertyShape>,
        variants: Vec<VariantShape>,
    },
}

impl TypeShape {
    /// Object and polymorphic shapes become shared component definitions.
    pub fn is_composite(&self) -> bool {
        matches!(self, TypeShape::Object { .. } | TypeShape::Polymorphic { .. })
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────────

/// Source of type shapes.
pub trait TypeCatalog: Send + Sync {
    /// The shape of `ty`, or `None` when the type is unknown.
    fn shape(&self, ty: &TypeKey) -> Option<TypeShape>;
}

/// Default discriminator property used by [`TypeSet::derived`].
pub const DEFAULT_DISCRIMINATOR: &str = "$type";

/// In-memory [`TypeCatalog`].
///
/// ```ignore
/// let types = TypeSet::with_primitives()
///     .object("Address", &[("street", "string")])
///     .object("User", &[("id", "int"), ("address", "Address")])
///     .array_of("User");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    shapes: HashMap<TypeKey, TypeShape>,
}

impl TypeSet {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-filled with the built-in primitive names
    /// (`bool`, `int`, `long`, `float`, `double`, `string`, `uuid`,
    /// `date-time`, `date`, `binary`).
    pub fn with_primitives() -> Self {
        Self::new()
            .primitive("bool", PrimitiveType::Boolean)
            .primitive("int", PrimitiveType::Int32)
            .primitive("long", PrimitiveType::Int64)
            .primitive("float", PrimitiveType::Float)
            .primitive("double", PrimitiveType::Double)
            .primitive("string", PrimitiveType::String)
            .primitive("uuid", PrimitiveType::Uuid)
            .primitive("date-time", PrimitiveType::DateTime)
            .primitive("date", PrimitiveType::Date)
            .primitive("binary", PrimitiveType::Binary)
    }

    /// Register (or replace) the shape of a type.
    pub fn insert(&mut self, ty: impl Into<TypeKey>, shape: TypeShape) -> &mut Self {
        self.shapes.insert(ty.into(), shape);
        self
    }

    pub fn primitive(mut self, ty: impl Into<TypeKey>, primitive: PrimitiveType) -> Self {
        self.insert(ty, TypeShape::Primitive(primitive));
        self
    }

    /// Register an object type whose properties are all required.
    ///
    /// Each property is `(name, type)`, in declaration order.
    pub fn object(mut self, ty: impl Into<TypeKey>, properties: &[(&str, &str)]) -> Self {
        let properties = properties
            .iter()
            .map(|(name, prop_ty)| PropertyShape {
                name: name.to_string(),
                ty: TypeKey::new(*prop_ty),
                required: true,
            })
            .collect();
        self.insert(ty, TypeShape::Object { properties });
        self
    }

    /// Register `element[]` as an array of `element`.
    pub fn array_of(mut self, element: impl Into<TypeKey>) -> Self {
        let element = element.into();
        self.insert(
            TypeKey::array_of(&element),
            TypeShape::Array { element },
        );
        self
    }

    /// Register `derived` as a variant of the polymorphic type `base`.
    ///
    /// An object base is promoted to a polymorphic shape using
    /// [`DEFAULT_DISCRIMINATOR`]. Variants keep the order in which they
    /// were first registered; registering the same derived type twice
    /// keeps the first registration.
    pub fn derived(
        mut self,
        base: impl Into<TypeKey>,
        discriminator: &str,
        derived: impl Into<TypeKey>,
    ) -> Self {
        let base = base.into();
        let derived = derived.into();
        let shape = self.shapes.remove(&base).unwrap_or(TypeShape::Object {
            properties: Vec::new(),
        });
        let (discriminator_property, properties, mut variants) = match shape {
            TypeShape::Polymorphic {
                discriminator_property,
                properties,
                variants,
            } => (discriminator_property, properties, variants),
            TypeShape::Object { properties } => {
                (DEFAULT_DISCRIMINATOR.to_string(), properties, Vec::new())
            }
            other => {
                // Primitive and array bases cannot carry variants.
                self.shapes.insert(base, other);
                return self;
            }
        };
        if !variants.iter().any(|v| v.ty == derived) {
            variants.push(VariantShape {
                discriminator: discriminator.to_string(),
                ty: derived,
            });
        }
        self.shapes.insert(
            base,
            TypeShape::Polymorphic {
                discriminator_property,
                properties,
                variants,
            },
        );
        self
    }

    /// Override the discriminator property of a polymorphic base.
    pub fn discriminator_property(mut self, base: impl Into<TypeKey>, property: &str) -> Self {
        let base: TypeKey = base.into();
        if let Some(TypeShape::Polymorphic {
            discriminator_property,
            ..
        }) = self.shapes.get_mut(&base)
        {
            *discriminator_property = property.to_string();
        }
        self
    }

    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.shapes.contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl TypeCatalog for TypeSet {
    fn shape(&self, ty: &TypeKey) -> Option<TypeShape> {
        self.shapes.get(ty).cloned()
    }
}
