use super::*;
use crate::describe::Value;
use crate::types::{FnSig, SignatureKind};

fn sig(text: &str) -> FnSig {
    text.parse().unwrap()
}

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

fn iterable() -> TypeDescription {
    TypeDescription::new("Iterable")
        .required("next", sig("fn(*Self) i32"))
        .function("printNext", sig("fn(*Self) void"), |_, _| Ok(Value::Void))
        .constant("LIMIT", ty("i32"), Value::Int(3))
        .nested("Item", TypeDescription::new("Item"))
}

#[test]
fn test_shape_role_keeps_requirements_and_nested_types() {
    let signatures = extract(&iterable(), Role::Shape).unwrap();
    let names: Vec<&str> = signatures.iter().map(|s| &*s.name).collect();
    assert_eq!(names, ["next", "Item"]);
    assert_eq!(signatures[0].kind, SignatureKind::Function);
    assert_eq!(signatures[0].params[0].ty, TypeRef::self_ref(Role::Shape, 1));
    assert_eq!(signatures[1].kind, SignatureKind::NestedType);
}

#[test]
fn test_shape_role_includes_private_requirements() {
    let shape = TypeDescription::new("Hidden")
        .required("secret", sig("fn() void"))
        .private();
    let signatures = extract(&shape, Role::Shape).unwrap();
    assert_eq!(signatures.len(), 1);
    assert!(signatures[0].flags.contains(SignatureFlags::PRIVATE));
}

#[test]
fn test_candidate_role_public_members_only() {
    let candidate = TypeDescription::new("Counter")
        .field("current", ty("i32"))
        .function("next", sig("fn(*Counter) i32"), |_, _| Ok(Value::Int(0)))
        .function("bump", sig("fn(*Self) void"), |_, _| Ok(Value::Void))
        .private()
        .constant("STEP", ty("i32"), Value::Int(1));
    let signatures = extract(&candidate, Role::Candidate).unwrap();
    let kinds: Vec<(&str, SignatureKind)> =
        signatures.iter().map(|s| (&*s.name, s.kind)).collect();
    assert_eq!(
        kinds,
        [
            ("current", SignatureKind::Value),
            ("next", SignatureKind::Function),
            ("STEP", SignatureKind::Value),
        ]
    );
    // The own type name binds like `Self`.
    assert_eq!(
        signatures[1].params[0].ty,
        TypeRef::self_ref(Role::Candidate, 1)
    );
    assert!(signatures[1].has_body());
}

#[test]
fn test_dispatch_table_role() {
    let table = TypeDescription::new("AnimalTable")
        .field("speak", ty("*const fn(*Self) []const u8"))
        .field("age", ty("*const fn(*Self) u32"));
    let signatures = extract(&table, Role::DispatchTable).unwrap();
    assert_eq!(signatures.len(), 2);
    assert_eq!(signatures[0].type_text(), "fn(*Self) []const u8");
    assert!(signatures[0].params[0].ty.is_self_of(Role::DispatchTable));
}

#[test]
fn test_dispatch_table_rejects_non_function_fields() {
    let table = TypeDescription::new("AnimalTable")
        .field("speak", ty("*const fn(*Self) []const u8"))
        .field("legs", ty("u32"));
    let err = extract(&table, Role::DispatchTable).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::NonFunctionSlot {
            table: "AnimalTable".into(),
            field: "legs".into(),
            found: "u32".to_string(),
        }
    );
}

#[test]
fn test_duplicate_member_is_configuration_error() {
    let shape = TypeDescription::new("Animal")
        .required("speak", sig("fn() []const u8"))
        .function("speak", sig("fn() []const u8"), |_, _| Ok(Value::from("???")));
    for role in [Role::Shape, Role::Candidate] {
        let err = extract(&shape, role).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateMember {
                type_name: "Animal".into(),
                member: "speak".into(),
            }
        );
    }
}

#[test]
fn test_too_many_parameters() {
    let params = std::iter::repeat_n(TypeRef::named("i32"), MAX_PARAMETERS + 1);
    let wide = TypeDescription::new("Wide").required("call", FnSig::new(params, TypeRef::void()));
    let err = extract(&wide, Role::Shape).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::TooManyParameters { count, .. } if count == MAX_PARAMETERS + 1
    ));
}

#[test]
fn test_extractor_struct_matches_function() {
    let shape = iterable();
    let via_struct = Extractor::new(&shape, Role::Shape).extract().unwrap();
    assert_eq!(via_struct, extract(&shape, Role::Shape).unwrap());
}
