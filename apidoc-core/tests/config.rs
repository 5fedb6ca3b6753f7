use apidoc_core::config::{ApidocConfig, ConfigError, ConfigValue};
use std::io::Write;

#[test]
fn test_empty_config() {
    let config = ApidocConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = ApidocConfig::empty();
    config.set("openapi.title", ConfigValue::String("Shop".into()));
    assert_eq!(config.get::<String>("openapi.title").unwrap(), "Shop");
    assert!(config.contains_key("openapi.title"));
}

#[test]
fn test_get_or_default() {
    let config = ApidocConfig::empty();
    assert_eq!(config.get_or("missing", 42i64), 42);
}

#[test]
fn test_get_opt() {
    let mut config = ApidocConfig::empty();
    config.set("port", ConfigValue::String("not a number".into()));
    assert_eq!(config.get_opt::<i64>("missing").unwrap(), None);
    assert!(matches!(
        config.get_opt::<i64>("port"),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_type_conversions() {
    let mut config = ApidocConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(2.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<u16>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 2.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
}

#[test]
fn test_integer_out_of_range() {
    let mut config = ApidocConfig::empty();
    config.set("big", ConfigValue::Integer(70_000));
    assert!(matches!(
        config.get::<u16>("big"),
        Err(ConfigError::TypeMismatch { expected: "u16", .. })
    ));
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
openapi:
  title: "Shop API"
  version: "2.0.0"
  documents:
    internal:
      title: "Shop internals"
"#;
    let config = ApidocConfig::from_yaml_str(yaml).unwrap();

    assert_eq!(config.get::<String>("openapi.title").unwrap(), "Shop API");
    assert_eq!(config.get::<String>("openapi.version").unwrap(), "2.0.0");
    assert_eq!(
        config.get::<String>("openapi.documents.internal.title").unwrap(),
        "Shop internals"
    );
}

#[test]
fn test_list_config() {
    let yaml = r#"
openapi:
  documents_order:
    - v1
    - v2
"#;
    let config = ApidocConfig::from_yaml_str(yaml).unwrap();
    let order: Vec<String> = config.get("openapi.documents_order").unwrap();
    assert_eq!(order, vec!["v1", "v2"]);
}

#[test]
fn test_scalar_as_single_element_list() {
    let mut config = ApidocConfig::empty();
    config.set("tags", ConfigValue::String("users".into()));
    let tags: Vec<String> = config.get("tags").unwrap();
    assert_eq!(tags, vec!["users"]);
}

#[test]
fn test_invalid_yaml_is_load_error() {
    let result = ApidocConfig::from_yaml_str("openapi: [unterminated");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

// ── Environment overlay ─────────────────────────────────────────────────────

#[test]
fn test_env_overlay_maps_prefixed_keys() {
    let mut config = ApidocConfig::from_yaml_str("openapi:\n  title: File\n").unwrap();
    config.overlay_env(vec![
        ("APIDOC_OPENAPI_TITLE".to_string(), "Env".to_string()),
        ("APIDOC_OPENAPI_DOCUMENTS_V2_VERSION".to_string(), "3.0".to_string()),
        ("UNRELATED_OPENAPI_TITLE".to_string(), "ignored".to_string()),
    ]);

    assert_eq!(config.get::<String>("openapi.title").unwrap(), "Env");
    assert_eq!(
        config.get::<String>("openapi.documents.v2.version").unwrap(),
        "3.0"
    );
    assert!(!config.contains_key("unrelated.openapi.title"));
}

// ── File loading ────────────────────────────────────────────────────────────

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "openapi:\n  title: From file\n  version: \"1.2.3\"").unwrap();

    let config = ApidocConfig::load(file.path()).unwrap();
    assert_eq!(config.get::<String>("openapi.version").unwrap(), "1.2.3");
}

#[test]
fn test_load_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ApidocConfig::load(dir.path().join("absent.yaml")).unwrap();
    assert!(!config.contains_key("openapi.version"));
}
