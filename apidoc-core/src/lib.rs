//! Core types shared by the apidoc crates: endpoint metadata, declared
//! types and their shapes, keyed services, configuration and tracing setup.

pub mod config;
pub mod layers;
pub mod meta;
pub mod services;
pub mod types;

pub use config::{ApidocConfig, ConfigError, ConfigValue, FromConfigValue};
pub use layers::init_tracing;
pub use meta::{EndpointInfo, ParamInfo, ParamLocation, RequestBodyInfo, ResponseInfo};
pub use services::{ServiceProvider, ServiceRegistry};
pub use types::{
    PrimitiveType, PropertyShape, TypeCatalog, TypeKey, TypeSet, TypeShape, VariantShape,
    DEFAULT_DISCRIMINATOR,
};
