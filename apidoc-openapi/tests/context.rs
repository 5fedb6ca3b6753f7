use apidoc_core::{ParamInfo, ServiceProvider, ServiceRegistry, TypeKey};
use apidoc_openapi::{ContextBuilder, ParameterDescriptor, PropertyDescriptor, SchemaSite};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
struct Locale(&'static str);

fn builder(document: &str) -> ContextBuilder {
    let services = ServiceRegistry::new()
        .provide_keyed("v1", Locale("en"))
        .provide_keyed("v2", Locale("fr"))
        .build();
    ContextBuilder::new(document, Arc::new(services), CancellationToken::new())
}

fn param_site() -> SchemaSite {
    SchemaSite::Parameter(ParameterDescriptor::from_param(
        &ParamInfo::query("ids", "int[]"),
        "listUsers",
    ))
}

fn property_site() -> SchemaSite {
    SchemaSite::Property(PropertyDescriptor {
        name: "age".into(),
        declared_type: TypeKey::new("int"),
        parent_type: TypeKey::new("User"),
    })
}

// ── Descriptors ─────────────────────────────────────────────────────────────

#[test]
fn body_site_has_no_descriptor() {
    let ctx = builder("v1").build(&TypeKey::new("User"), &SchemaSite::Body);
    assert_eq!(ctx.declared_type().name(), "User");
    assert!(ctx.parameter_descriptor().is_none());
    assert!(ctx.property_descriptor().is_none());
    assert!(ctx.property_name().is_none());
}

#[test]
fn parameter_site_exposes_parameter_only() {
    let ctx = builder("v1").build(&TypeKey::new("int[]"), &param_site());
    let param = ctx.parameter_descriptor().unwrap();
    assert_eq!(param.name, "ids");
    assert_eq!(param.operation_id, "listUsers");
    assert_eq!(param.declared_type.name(), "int[]");
    assert!(ctx.property_descriptor().is_none());
}

#[test]
fn property_site_exposes_property_only() {
    let ctx = builder("v1").build(&TypeKey::new("int"), &property_site());
    assert_eq!(ctx.property_name(), Some("age"));
    assert_eq!(ctx.property_descriptor().unwrap().parent_type.name(), "User");
    assert!(ctx.parameter_descriptor().is_none());
    assert!(ctx.is::<i32>());
    assert!(!ctx.is::<String>());
}

#[test]
fn nested_sites_keep_parameters_and_drop_properties() {
    assert_eq!(param_site().nested(), param_site());
    assert_eq!(property_site().nested(), SchemaSite::Body);
    assert_eq!(SchemaSite::Body.nested(), SchemaSite::Body);
}

// ── Document & services ─────────────────────────────────────────────────────

#[test]
fn keyed_service_follows_document_name() {
    let v1 = builder("v1").build(&TypeKey::new("User"), &SchemaSite::Body);
    let v2 = builder("v2").build(&TypeKey::new("User"), &SchemaSite::Body);
    let v3 = builder("v3").build(&TypeKey::new("User"), &SchemaSite::Body);

    assert_eq!(v1.document_name(), "v1");
    assert_eq!(v1.resolve_keyed_service::<Locale>(), Some(Locale("en")));
    assert_eq!(v2.resolve_keyed_service::<Locale>(), Some(Locale("fr")));
    assert_eq!(v3.resolve_keyed_service::<Locale>(), None);
}

#[test]
fn cancellation_is_shared_with_caller() {
    let token = CancellationToken::new();
    let contexts = ContextBuilder::new("v1", Arc::new(ServiceProvider::empty()), token.clone());
    let ctx = contexts.build(&TypeKey::new("User"), &SchemaSite::Body);

    assert!(!ctx.is_cancelled());
    token.cancel();
    assert!(ctx.is_cancelled());
    assert!(ctx.cancellation_token().is_cancelled());
}
