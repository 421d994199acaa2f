use super::config::{ManifestMode, MemberSpecKind, json_value, load_manifest, parse_manifest};
use shapecheck_solver::{CheckMode, MemberKind, Value};
use std::io::Write;

const ANIMALS: &str = r#"
{
  "types": [
    { "name": "Animal", "members": [
        { "name": "name", "type": "fn(*Self) []const u8" },
        { "name": "speak", "type": "fn(*Self) []const u8", "default": true },
        { "name": "LEGS", "kind": "const", "type": "u32", "value": 4 } ] },
    { "name": "Dog", "implemented": true, "members": [
        { "name": "age", "kind": "field", "type": "u32", "value": 1 },
        { "name": "name", "type": "fn(*Dog) []const u8" },
        { "name": "speak", "type": "fn(*Self) []const u8" },
        { "name": "secret", "type": "fn(*Self) void", "private": true } ] }
  ],
  "checks": [
    { "shape": "Animal", "candidate": "Dog", "mode": "override" },
    { "shape": "Animal", "candidate": "Dog" }
  ]
}
"#;

#[test]
fn parses_manifest_with_defaults() {
    let manifest = parse_manifest(ANIMALS).expect("manifest should parse");
    assert_eq!(manifest.types.len(), 2);
    assert!(manifest.vtables.is_empty());
    assert_eq!(manifest.checks[0].mode, ManifestMode::Override);
    assert_eq!(manifest.checks[1].mode, ManifestMode::Compose);
    assert_eq!(CheckMode::from(manifest.checks[1].mode), CheckMode::Compose);

    let animal = &manifest.types[0];
    assert!(!animal.implemented);
    assert_eq!(animal.members[0].kind, MemberSpecKind::Function);
    assert_eq!(animal.members[2].kind, MemberSpecKind::Const);
}

#[test]
fn resolves_member_kinds_and_bodies() {
    let resolved = parse_manifest(ANIMALS).unwrap().resolve().unwrap();
    let animal = resolved.get("Animal").unwrap();
    assert!(matches!(
        animal.member("name").unwrap().kind,
        MemberKind::Function { body: None, .. }
    ));
    assert!(matches!(
        animal.member("speak").unwrap().kind,
        MemberKind::Function { body: Some(_), .. }
    ));
    let MemberKind::Const { value, .. } = &animal.member("LEGS").unwrap().kind else {
        panic!("LEGS should be a constant");
    };
    assert_eq!(value, &Value::Int(4));

    let dog = resolved.get("Dog").unwrap();
    assert!(matches!(
        dog.member("name").unwrap().kind,
        MemberKind::Function { body: Some(_), .. }
    ));
    assert!(!dog.member("secret").unwrap().is_public());
    let MemberKind::Field { default, .. } = &dog.member("age").unwrap().kind else {
        panic!("age should be a field");
    };
    assert_eq!(default, &Some(Value::Int(1)));
}

#[test]
fn resolves_nested_types_by_name() {
    let source = r#"
    {
      "types": [
        { "name": "Container", "members": [
            { "name": "Item", "kind": "nested", "type": "Node" } ] },
        { "name": "Node", "members": [
            { "name": "get", "type": "fn(*Self) i32" } ] }
      ]
    }
    "#;
    let resolved = parse_manifest(source).unwrap().resolve().unwrap();
    let MemberKind::NestedType(inner) = &resolved.get("Container").unwrap().member("Item").unwrap().kind
    else {
        panic!("Item should be a nested type");
    };
    assert_eq!(&**inner.name(), "Node");
    assert!(inner.member("get").is_some());
}

#[test]
fn rejects_self_nesting() {
    let source = r#"
    { "types": [
        { "name": "A", "members": [ { "name": "B", "kind": "nested", "type": "B" } ] },
        { "name": "B", "members": [ { "name": "A", "kind": "nested", "type": "A" } ] } ] }
    "#;
    let err = parse_manifest(source).unwrap().resolve().unwrap_err();
    assert!(format!("{err:#}").contains("nests itself"));
}

#[test]
fn rejects_duplicate_types_and_unknown_references() {
    let duplicate = r#"{ "types": [ { "name": "A" }, { "name": "A" } ] }"#;
    let err = parse_manifest(duplicate).unwrap().resolve().unwrap_err();
    assert!(err.to_string().contains("declared more than once"));

    let unknown = r#"{ "types": [ { "name": "A" } ],
                       "checks": [ { "shape": "A", "candidate": "Missing" } ] }"#;
    let err = parse_manifest(unknown).unwrap().resolve().unwrap_err();
    assert!(err.to_string().contains("unknown type 'Missing'"));

    let table = r#"{ "vtables": [ { "table": "T", "implementation": "I" } ] }"#;
    assert!(parse_manifest(table).unwrap().resolve().is_err());
}

#[test]
fn reports_bad_signatures_with_context() {
    let source = r#"{ "types": [ { "name": "A", "members": [
        { "name": "broken", "type": "fn(*Self i32" } ] } ] }"#;
    let err = parse_manifest(source).unwrap().resolve().unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("type 'A' member 'broken'"));
    assert!(text.contains("invalid signature"));
}

#[test]
fn rejects_malformed_json() {
    assert!(parse_manifest("{ \"types\": [ }").is_err());
    assert!(parse_manifest(r#"{ "types": [ { "members": [] } ] }"#).is_err());
}

#[test]
fn converts_json_scalars() {
    assert_eq!(json_value(&serde_json::json!(null)).unwrap(), Value::Void);
    assert_eq!(json_value(&serde_json::json!(true)).unwrap(), Value::Bool(true));
    assert_eq!(json_value(&serde_json::json!(-3)).unwrap(), Value::Int(-3));
    assert_eq!(json_value(&serde_json::json!(2.5)).unwrap(), Value::Float(2.5));
    assert_eq!(json_value(&serde_json::json!("hi")).unwrap(), Value::from("hi"));
    assert!(json_value(&serde_json::json!([1, 2])).is_err());
}

#[test]
fn loads_manifest_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(ANIMALS.as_bytes()).expect("write manifest");
    let manifest = load_manifest(file.path()).expect("manifest should load");
    assert_eq!(manifest.checks.len(), 2);

    let missing = file.path().with_extension("missing");
    let err = load_manifest(&missing).unwrap_err();
    assert!(err.to_string().contains("failed to read manifest"));
}
