use apidoc_core::TypeKey;
use apidoc_openapi::{
    OpenApiError, PropertyDescriptor, SchemaId, SchemaNode, SchemaRef, SchemaStore, StoreEntry,
};

fn property(parent: &str, name: &str, ty: &str) -> PropertyDescriptor {
    PropertyDescriptor {
        name: name.to_string(),
        declared_type: TypeKey::new(ty),
        parent_type: TypeKey::new(parent),
    }
}

// ── Identity ────────────────────────────────────────────────────────────────

#[test]
fn get_or_create_reserves_once() {
    let mut store = SchemaStore::new();
    let user = TypeKey::new("User");

    let first = store.get_or_create(&user, None);
    let second = store.get_or_create(&user, None);

    assert_eq!(first, StoreEntry::Vacant(SchemaId::new("User")));
    assert_eq!(second, StoreEntry::Occupied(SchemaId::new("User")));
    assert_eq!(store.len(), 1);
}

#[test]
fn property_keys_get_their_own_id() {
    let mut store = SchemaStore::new();
    let int = TypeKey::new("int");

    let age = store.get_or_create(&int, Some(&property("User", "age", "int")));
    let count = store.get_or_create(&int, Some(&property("Order", "count", "int")));
    let bare = store.get_or_create(&int, None);

    assert_eq!(age.id().as_str(), "User.age");
    assert_eq!(count.id().as_str(), "Order.count");
    assert_eq!(bare.id().as_str(), "int");
    assert_eq!(
        store.lookup(&int, Some(&property("User", "age", "int"))),
        Some(&SchemaId::new("User.age"))
    );
}

#[test]
fn colliding_ids_get_numeric_suffix() {
    let mut store = SchemaStore::new();
    let from_property = store.get_or_create(&TypeKey::new("int"), Some(&property("User", "age", "int")));
    let from_type = store.get_or_create(&TypeKey::new("User.age"), None);
    let third = store.get_or_create(&TypeKey::new("string"), Some(&property("User", "age", "string")));

    assert_eq!(from_property.into_id().as_str(), "User.age");
    assert_eq!(from_type.into_id().as_str(), "User.age2");
    assert_eq!(third.into_id().as_str(), "User.age3");
}

#[test]
fn reserved_id_resolves_to_placeholder() {
    let mut store = SchemaStore::new();
    let id = store.get_or_create(&TypeKey::new("Node"), None).into_id();

    let placeholder = store.get(&id).unwrap();
    assert_eq!(placeholder.id.as_ref(), Some(&id));
    assert_eq!(placeholder.declared_type, Some(TypeKey::new("Node")));
}

// ── Definitions ─────────────────────────────────────────────────────────────

#[test]
fn define_stamps_identity() {
    let mut store = SchemaStore::new();
    let id = store.get_or_create(&TypeKey::new("int"), None).into_id();

    store
        .define(&id, SchemaNode::primitive("integer", Some("int32")))
        .unwrap();

    let node = store.get(&id).unwrap();
    assert_eq!(node.id.as_ref(), Some(&id));
    assert_eq!(node.declared_type, Some(TypeKey::new("int")));
    assert_eq!(node.format.as_deref(), Some("int32"));
}

#[test]
fn define_unreserved_id_fails() {
    let mut store = SchemaStore::new();
    let err = store
        .define(&SchemaId::new("Ghost"), SchemaNode::object())
        .unwrap_err();
    assert!(matches!(err, OpenApiError::ReferenceResolution { ref id } if id.as_str() == "Ghost"));
}

#[test]
fn resolve_follows_one_level() {
    let mut store = SchemaStore::new();
    let id = store.get_or_create(&TypeKey::new("User"), None).into_id();

    let by_ref = SchemaRef::Ref(id.clone());
    assert_eq!(store.resolve(&by_ref).unwrap().id.as_ref(), Some(&id));

    let inline = SchemaRef::inline(SchemaNode::primitive("string", None));
    assert_eq!(
        store.resolve(&inline).unwrap().schema_type.as_deref(),
        Some("string")
    );

    let dangling = SchemaRef::Ref(SchemaId::new("Missing"));
    assert!(matches!(
        store.resolve(&dangling),
        Err(OpenApiError::ReferenceResolution { .. })
    ));
}

#[test]
fn iter_is_insertion_ordered() {
    let mut store = SchemaStore::new();
    for name in ["Zebra", "Apple", "Mango"] {
        store.get_or_create(&TypeKey::new(name), None);
    }
    let ids: Vec<&str> = store.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["Zebra", "Apple", "Mango"]);
    assert!(store.contains(&SchemaId::new("Apple")));
}
