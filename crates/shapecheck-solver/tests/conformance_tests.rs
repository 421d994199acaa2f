use super::*;
use crate::describe::Value;
use crate::diagnostics::ViolationKind;
use crate::types::FnSig;

fn sig(text: &str) -> FnSig {
    text.parse().unwrap()
}

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

fn shape_requiring(name: &str, text: &str) -> TypeDescription {
    TypeDescription::new("Shape").required(name, sig(text))
}

fn candidate_with(name: &str, text: &str) -> TypeDescription {
    TypeDescription::new("Impl")
        .field("state", ty("i32"))
        .function(name, sig(text), |_, _| Ok(Value::Void))
}

fn kinds(shape: &TypeDescription, candidate: &TypeDescription) -> Vec<ViolationKind> {
    ConformanceChecker::new(shape, candidate)
        .violations()
        .unwrap()
        .iter()
        .map(Violation::kind)
        .collect()
}

#[test]
fn test_identical_members_conform() {
    let shape = shape_requiring("next", "fn(*Self) i32");
    let candidate = candidate_with("next", "fn(*Self) i32");
    let checker = ConformanceChecker::new(&shape, &candidate);
    assert!(checker.violations().unwrap().is_empty());
    assert!(checker.is_conformant());
    assert!(checker.check().is_ok());
}

#[test]
fn test_candidate_own_name_counts_as_self() {
    let shape = shape_requiring("clone", "fn(*Self) Self");
    let candidate = candidate_with("clone", "fn(*Impl) Impl");
    assert!(kinds(&shape, &candidate).is_empty());
}

#[test]
fn test_missing_member_reported_once() {
    let shape = shape_requiring("next", "fn(*Self) i32");
    let candidate = candidate_with("other", "fn(*Self) i32");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].reason,
        FailureReason::MissingMember {
            expected: "fn(*Self) i32".to_string()
        }
    );
}

#[test]
fn test_arity_mismatch_stops_member_checks() {
    let shape = shape_requiring("magic", "fn(*Self, i32, i64, f32) f32");
    let candidate = candidate_with("magic", "fn(*Self, u8, u8) u8");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].reason,
        FailureReason::ArityMismatch {
            expected: 4,
            found: 3
        }
    );
}

#[test]
fn test_self_depth_must_match() {
    let shape = shape_requiring("next", "fn(*Self) Self");
    let candidate = candidate_with("next", "fn(**Self) Self");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind(), ViolationKind::ParameterTypeMismatch);
    let FailureReason::PositionMismatch { mismatches, .. } = &violations[0].reason else {
        panic!("expected a position mismatch");
    };
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].index, 0);
    assert_eq!(mismatches[0].expected.to_string(), "*Self");
    assert_eq!(mismatches[0].found.to_string(), "**Self");
}

#[test]
fn test_every_mismatching_position_recorded() {
    let shape = shape_requiring("mix", "fn(*Self, i32, i64) bool");
    let candidate = candidate_with("mix", "fn(*Self, u32, i64) u8");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    let FailureReason::PositionMismatch {
        mismatches,
        rendered,
    } = &violations[0].reason
    else {
        panic!("expected a position mismatch");
    };
    let indices: Vec<(usize, bool)> = mismatches.iter().map(|m| (m.index, m.is_return)).collect();
    assert_eq!(indices, [(1, false), (3, true)]);
    assert_eq!(rendered.header, "fn mix(*Self, u32, i64) u8");
    assert_eq!(rendered.explanations.len(), 2);
}

#[test]
fn test_return_only_mismatch() {
    let shape = shape_requiring("get", "fn(*Self) i32");
    let candidate = candidate_with("get", "fn(*Self) i64");
    assert_eq!(
        kinds(&shape, &candidate),
        [ViolationKind::ReturnTypeMismatch]
    );
}

#[test]
fn test_requirement_wildcard_accepts_anything() {
    let shape = shape_requiring("write", "fn(anytype) anytype");
    let candidate = candidate_with("write", "fn(i32) i32");
    assert!(kinds(&shape, &candidate).is_empty());

    let both = candidate_with("write", "fn(anytype) anytype");
    assert!(kinds(&shape, &both).is_empty());
}

#[test]
fn test_candidate_wildcard_does_not_satisfy_concrete() {
    let shape = shape_requiring("write", "fn(i32) void");
    let candidate = candidate_with("write", "fn(anytype) void");
    assert_eq!(
        kinds(&shape, &candidate),
        [ViolationKind::ParameterTypeMismatch]
    );
}

#[test]
fn test_not_a_function() {
    let shape = shape_requiring("state", "fn(*Self) i32");
    let candidate = candidate_with("next", "fn(*Self) i32");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    assert_eq!(
        violations[0].reason,
        FailureReason::NotAFunction {
            found: SignatureKind::Value
        }
    );
}

#[test]
fn test_nested_type_requirements() {
    let shape = TypeDescription::new("Container").nested("Item", TypeDescription::new("Item"));
    let good = TypeDescription::new("List").nested("Item", TypeDescription::new("Node"));
    assert!(kinds(&shape, &good).is_empty());

    let bad = candidate_with("Item", "fn() void");
    assert_eq!(kinds(&shape, &bad), [ViolationKind::NotANestedType]);
}

#[test]
fn test_all_requirements_evaluated_in_order() {
    let shape = TypeDescription::new("Shape")
        .required("a", sig("fn() i32"))
        .required("b", sig("fn() i32"))
        .required("c", sig("fn(i32) i32"));
    let candidate = TypeDescription::new("Impl")
        .function("c", sig("fn() i32"), |_, _| Ok(Value::Int(0)))
        .function("b", sig("fn() u8"), |_, _| Ok(Value::Int(0)));
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    let summary: Vec<(&str, ViolationKind)> =
        violations.iter().map(|v| (&*v.member, v.kind())).collect();
    assert_eq!(
        summary,
        [
            ("a", ViolationKind::MissingMember),
            ("b", ViolationKind::ReturnTypeMismatch),
            ("c", ViolationKind::ArityMismatch),
        ]
    );
}

#[test]
fn test_stored_field_in_shape_is_configuration_error() {
    let shape = shape_requiring("next", "fn(*Self) i32").field("count", ty("i32"));
    let candidate = candidate_with("next", "fn(*Self) i32");
    let err = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap_err();
    assert_eq!(
        err,
        ConformanceError::Configuration(ConfigurationError::NonBehavioralShape {
            shape: "Shape".into(),
            fields: vec!["count".into()],
        })
    );
    assert!(!ConformanceChecker::new(&shape, &candidate).is_conformant());
}

#[test]
fn test_default_redefinition_depends_on_mode() {
    let shape = TypeDescription::new("Animal")
        .required("name", sig("fn(*Self) []const u8"))
        .function("speak", sig("fn(*Self) []const u8"), |_, _| {
            Ok(Value::from("???"))
        });
    let candidate = TypeDescription::new("Dog")
        .function("name", sig("fn(*Self) []const u8"), |_, _| Ok(Value::from("Rex")))
        .function("speak", sig("fn(*Self) []const u8"), |_, _| {
            Ok(Value::from("Hello"))
        });

    let compose = ConformanceChecker::new(&shape, &candidate);
    let violations = compose.violations().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].reason,
        FailureReason::DefaultRedefined {
            shape: "Animal".into()
        }
    );
    assert_eq!(
        violations[0].message(),
        "member 'speak' redefines a default implementation supplied by 'Animal'"
    );

    let override_mode = ConformanceChecker::new(&shape, &candidate).with_mode(CheckMode::Override);
    assert_eq!(override_mode.mode(), CheckMode::Override);
    assert!(override_mode.is_conformant());
}

#[test]
fn test_private_member_redefining_default_is_reported() {
    let shape = TypeDescription::new("Animal").function(
        "speak",
        sig("fn(*Self) []const u8"),
        |_, _| Ok(Value::from("???")),
    );
    let candidate = TypeDescription::new("Dog")
        .function("speak", sig("fn(*Self) []const u8"), |_, _| {
            Ok(Value::from("Hello"))
        })
        .private();

    assert_eq!(
        kinds(&shape, &candidate),
        [ViolationKind::DefaultRedefined]
    );
    assert!(crate::check_conformance(&shape, &candidate).is_err());
}

#[test]
fn test_stored_field_reported_before_malformed_candidate() {
    let shape = shape_requiring("next", "fn(*Self) i32").field("count", ty("i32"));
    let candidate = candidate_with("next", "fn(*Self) i32").function(
        "next",
        sig("fn(*Self) i32"),
        |_, _| Ok(Value::Int(0)),
    );
    let err = ConformanceChecker::new(&shape, &candidate)
        .check()
        .unwrap_err();
    assert!(matches!(
        err,
        ConformanceError::Configuration(ConfigurationError::NonBehavioralShape { .. })
    ));
}

#[test]
fn test_rendered_header_shows_declaration_as_written() {
    let shape = shape_requiring("next", "fn(*Self) i32");
    let candidate = candidate_with("next", "fn(*Impl) u8");
    let violations = ConformanceChecker::new(&shape, &candidate)
        .violations()
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind(), ViolationKind::ReturnTypeMismatch);

    let rendered = violations[0].rendered_signature().unwrap();
    assert_eq!(rendered.header, "fn next(*Impl) u8");
    assert_eq!(rendered.underline, "               ^^");
    assert_eq!(
        rendered.explanations,
        ["               expected type 'i32', found 'u8'"]
    );
}

#[test]
fn test_check_reports_every_violation() {
    let shape = TypeDescription::new("Iterable")
        .required("next", sig("fn(*Self) i32"))
        .required("reset", sig("fn(*Self) void"));
    let candidate = TypeDescription::new("Counter").field("current", ty("i32"));
    let err = ConformanceChecker::new(&shape, &candidate)
        .check()
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(&*report.shape, "Iterable");
    assert_eq!(&*report.candidate, "Counter");
    assert_eq!(report.violations.len(), 2);
}

#[test]
fn test_fast_path_agrees_with_collector() {
    let shape = shape_requiring("next", "fn(*Self) i32");
    for text in ["fn(*Self) i32", "fn(**Self) i32", "fn() i32", "fn(*Self) anytype"] {
        let candidate = candidate_with("next", text);
        let checker = ConformanceChecker::new(&shape, &candidate);
        assert_eq!(
            checker.is_conformant(),
            checker.violations().unwrap().is_empty(),
            "disagreement for {text}"
        );
    }
}

#[test]
fn test_slot_compatible_function_pointers() {
    assert!(slot_compatible(
        &ty("*const fn(anytype) void"),
        &ty("*const fn(i32) void")
    ));
    assert!(!slot_compatible(
        &ty("*const fn(i32) void"),
        &ty("*const fn(i32, i32) void")
    ));
    assert!(!slot_compatible(&ty("*const fn(i32) void"), &ty("i32")));
}
