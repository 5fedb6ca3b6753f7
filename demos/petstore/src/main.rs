use std::sync::Arc;

use apidoc::apidoc_openapi::{BoxError, DocumentSet, SchemaNode, TransformContext};
use apidoc::prelude::*;

#[derive(Clone)]
struct Audience(&'static str);

fn types() -> TypeSet {
    TypeSet::with_primitives()
        .object("Owner", &[("id", "uuid"), ("name", "string")])
        .object("Cat", &[("name", "string"), ("lives", "int"), ("owner", "Owner")])
        .object("Dog", &[("name", "string"), ("good", "bool")])
        .derived("Pet", "cat", "Cat")
        .derived("Pet", "dog", "Dog")
        .discriminator_property("Pet", "kind")
        .array_of("Pet")
}

fn endpoints() -> Vec<EndpointInfo> {
    vec![
        EndpointInfo::new("GET", "/pets", "listPets")
            .with_tag("pets")
            .with_param(ParamInfo::query("limit", "int"))
            .with_response(200, "Pet[]"),
        EndpointInfo::new("GET", "/pets/{id}", "getPet")
            .with_tag("pets")
            .with_param(ParamInfo::path("id", "uuid"))
            .with_response(200, "Pet")
            .with_empty_response(404),
        EndpointInfo::new("POST", "/pets", "createPet")
            .with_tag("pets")
            .with_request_body("Pet")
            .with_response(201, "Pet"),
        EndpointInfo::new("DELETE", "/pets/{id}", "deletePet")
            .with_group("admin")
            .with_param(ParamInfo::path("id", "uuid"))
            .with_empty_response(204),
    ]
}

/// Tags every schema with the audience of the document being built.
fn audience(schema: &mut SchemaNode, ctx: &TransformContext) -> Result<(), BoxError> {
    if let Some(Audience(audience)) = ctx.resolve_keyed_service::<Audience>() {
        schema.set_extension("x-audience", audience);
    }
    Ok(())
}

/// Path parameters get a human readable description.
fn describe_path_params(schema: &mut SchemaNode, ctx: &TransformContext) -> Result<(), BoxError> {
    if let Some(param) = ctx.parameter_descriptor() {
        if param.location == ParamLocation::Path {
            schema.description = Some(format!("`{}` of {}", param.name, param.operation_id));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ApidocConfig::load("application.yaml")?;
    let services = Arc::new(
        ServiceRegistry::new()
            .provide_keyed("v1", Audience("public"))
            .provide_keyed("admin", Audience("staff"))
            .build(),
    );
    let types: Arc<dyn TypeCatalog> = Arc::new(types());

    let mut set = DocumentSet::new();
    for name in ["v1", "admin"] {
        let builder = DocumentBuilder::new(OpenApiConfig::from_config(&config, name)?, Arc::clone(&types))
            .with_services(Arc::clone(&services))
            .with_sync_transformer(audience)
            .with_sync_transformer(describe_path_params);
        set = set.add(builder);
    }

    let shutdown = CancellationToken::new();
    let documents = set.build_all(&endpoints(), shutdown).await?;
    for (name, document) in &documents {
        tracing::info!(document = %name, operations = document.operations().count(), "Generated");
        println!("{}", serde_json::to_string_pretty(&document.to_json())?);
    }
    Ok(())
}
