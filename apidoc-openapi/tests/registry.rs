use apidoc_core::{ParamInfo, TypeKey, TypeSet};
use apidoc_openapi::{
    OpenApiError, SchemaId, SchemaKind, SchemaRef, SchemaStore, TypeRegistry, MAX_DEPTH,
};
use std::sync::Arc;

fn registry(types: TypeSet) -> TypeRegistry {
    TypeRegistry::new(Arc::new(types))
}

fn shop_types() -> TypeSet {
    TypeSet::with_primitives()
        .object("Address", &[("street", "string"), ("zip", "int")])
        .object("User", &[("name", "string"), ("age", "int"), ("address", "Address")])
        .object("Company", &[("age", "int"), ("address", "Address")])
        .array_of("User")
}

// ── Objects ─────────────────────────────────────────────────────────────────

#[test]
fn object_properties_in_declaration_order() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let id = registry.describe(&mut store, &TypeKey::new("User")).unwrap();
    let user = store.get(&id).unwrap();

    assert_eq!(user.kind, SchemaKind::Object);
    let names: Vec<&str> = user.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["name", "age", "address"]);
    assert_eq!(user.required, ["name", "age", "address"]);
    assert_eq!(
        user.property("address").and_then(SchemaRef::ref_id),
        Some(&SchemaId::new("Address"))
    );
}

#[test]
fn composite_types_share_one_definition() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let user = registry.describe(&mut store, &TypeKey::new("User")).unwrap();
    let company = registry.describe(&mut store, &TypeKey::new("Company")).unwrap();
    let address = registry.describe(&mut store, &TypeKey::new("Address")).unwrap();

    let from_user = store.get(&user).unwrap().property("address").cloned();
    let from_company = store.get(&company).unwrap().property("address").cloned();
    assert_eq!(from_user, Some(SchemaRef::Ref(address.clone())));
    assert_eq!(from_company, Some(SchemaRef::Ref(address)));
}

#[test]
fn primitives_are_keyed_by_containing_property() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let user = registry.describe(&mut store, &TypeKey::new("User")).unwrap();
    let company = registry.describe(&mut store, &TypeKey::new("Company")).unwrap();

    let user_age = store.get(&user).unwrap().property("age").and_then(SchemaRef::ref_id).cloned();
    let company_age = store
        .get(&company)
        .unwrap()
        .property("age")
        .and_then(SchemaRef::ref_id)
        .cloned();
    assert_eq!(user_age, Some(SchemaId::new("User.age")));
    assert_eq!(company_age, Some(SchemaId::new("Company.age")));

    let age = store.get(&SchemaId::new("User.age")).unwrap();
    assert_eq!(age.schema_type.as_deref(), Some("integer"));
    assert_eq!(age.format.as_deref(), Some("int32"));
}

#[test]
fn describe_is_idempotent() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let first = registry.describe(&mut store, &TypeKey::new("User")).unwrap();
    let size = store.len();
    let second = registry.describe(&mut store, &TypeKey::new("User")).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), size);
}

// ── Arrays & parameters ─────────────────────────────────────────────────────

#[test]
fn array_items_reference_element_definition() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let list = registry.describe(&mut store, &TypeKey::new("User[]")).unwrap();
    let node = store.get(&list).unwrap();

    assert_eq!(node.kind, SchemaKind::Array);
    assert_eq!(node.items(), Some(&SchemaRef::Ref(SchemaId::new("User"))));
}

#[test]
fn parameter_type_uses_standalone_definition() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let param = registry
        .describe_parameter(&mut store, &ParamInfo::path("id", "int"))
        .unwrap();
    assert_eq!(param.as_str(), "int");
}

// ── Polymorphism ────────────────────────────────────────────────────────────

#[test]
fn polymorphic_base_lists_variants_in_registration_order() {
    let types = TypeSet::with_primitives()
        .object("Circle", &[("radius", "double")])
        .object("Square", &[("side", "double")])
        .object("Shape", &[("label", "string")])
        .derived("Shape", "square", "Square")
        .derived("Shape", "circle", "Circle")
        .discriminator_property("Shape", "kind");
    let registry = registry(types);
    let mut store = SchemaStore::new();

    let id = registry.describe(&mut store, &TypeKey::new("Shape")).unwrap();
    let shape = store.get(&id).unwrap();

    assert_eq!(shape.kind, SchemaKind::Union);
    assert_eq!(
        shape.subschemas,
        [
            SchemaRef::Ref(SchemaId::new("Square")),
            SchemaRef::Ref(SchemaId::new("Circle")),
        ]
    );
    let discriminator = shape.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.property_name, "kind");
    assert_eq!(discriminator.mapping[0], ("square".to_string(), SchemaId::new("Square")));
    assert!(shape.property("label").is_some());
}

// ── Recursion & failures ────────────────────────────────────────────────────

#[test]
fn recursive_type_terminates() {
    let types = TypeSet::with_primitives()
        .object("TreeNode", &[("value", "int"), ("children", "TreeNode[]")])
        .array_of("TreeNode");
    let registry = registry(types);
    let mut store = SchemaStore::new();

    let id = registry.describe(&mut store, &TypeKey::new("TreeNode")).unwrap();
    let children = store
        .get(&id)
        .unwrap()
        .property("children")
        .and_then(SchemaRef::ref_id)
        .cloned()
        .unwrap();
    assert_eq!(children.as_str(), "TreeNode.children");
    assert_eq!(
        store.get(&children).unwrap().items(),
        Some(&SchemaRef::Ref(id))
    );
}

#[test]
fn unknown_type_is_resolution_failure() {
    let registry = registry(shop_types());
    let mut store = SchemaStore::new();

    let err = registry
        .describe(&mut store, &TypeKey::new("Invoice"))
        .unwrap_err();
    assert!(matches!(err, OpenApiError::TypeResolution { ref ty, .. } if ty.name() == "Invoice"));
}

#[test]
fn unknown_property_type_is_resolution_failure() {
    let types = TypeSet::with_primitives().object("Order", &[("total", "Money")]);
    let registry = registry(types);
    let mut store = SchemaStore::new();

    let err = registry.describe(&mut store, &TypeKey::new("Order")).unwrap_err();
    assert!(err.to_string().contains("Money"));
}

#[test]
fn excessive_nesting_is_resolution_failure() {
    let mut types = TypeSet::with_primitives();
    let levels = MAX_DEPTH + 2;
    for i in 0..levels {
        let next = format!("Level{}", i + 1);
        types = types.object(format!("Level{i}").as_str(), &[("next", next.as_str())]);
    }
    types = types.object(format!("Level{levels}").as_str(), &[("leaf", "int")]);
    let registry = registry(types);
    let mut store = SchemaStore::new();

    let err = registry.describe(&mut store, &TypeKey::new("Level0")).unwrap_err();
    assert!(err.to_string().contains("nesting deeper than"));
}
