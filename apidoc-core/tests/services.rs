use apidoc_core::{ServiceProvider, ServiceRegistry};

#[derive(Debug, Clone, PartialEq)]
struct Descriptions {
    language: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Clock(u64);

#[test]
fn test_unkeyed_service() {
    let services = ServiceRegistry::new().provide(Clock(7)).build();
    assert_eq!(services.get::<Clock>(), Some(Clock(7)));
    assert_eq!(services.get::<Descriptions>(), None);
}

#[test]
fn test_keyed_services_are_isolated() {
    let services = ServiceRegistry::new()
        .provide_keyed("v1", Descriptions { language: "en" })
        .provide_keyed("v2", Descriptions { language: "fr" })
        .build();

    assert_eq!(
        services.get_keyed::<Descriptions>("v1"),
        Some(Descriptions { language: "en" })
    );
    assert_eq!(
        services.get_keyed::<Descriptions>("v2"),
        Some(Descriptions { language: "fr" })
    );
    assert_eq!(services.get_keyed::<Descriptions>("v3"), None);
    assert!(services.contains_keyed::<Descriptions>("v1"));
    assert!(!services.contains_keyed::<Clock>("v1"));
}

#[test]
fn test_keyed_lookup_ignores_unkeyed_registration() {
    let services = ServiceRegistry::new().provide(Clock(1)).build();
    assert_eq!(services.get_keyed::<Clock>("v1"), None);
}

#[test]
fn test_later_registration_replaces_earlier() {
    let services = ServiceRegistry::new()
        .provide(Clock(1))
        .provide(Clock(2))
        .build();
    assert_eq!(services.get::<Clock>(), Some(Clock(2)));
    assert_eq!(services.len(), 1);
}

#[test]
fn test_empty_provider() {
    let services = ServiceProvider::empty();
    assert!(services.is_empty());
    assert_eq!(services.get::<Clock>(), None);
}

#[test]
fn test_debug_lists_service_types() {
    let services = ServiceRegistry::new().provide(Clock(1)).build();
    assert!(format!("{services:?}").contains("Clock"));
}
