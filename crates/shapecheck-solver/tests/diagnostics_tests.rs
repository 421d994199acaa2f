use super::*;
use crate::render::render_signature;
use crate::types::{FnSig, Role, Signature};

fn missing(member: &str) -> Violation {
    Violation::new(
        member.into(),
        FailureReason::MissingMember {
            expected: "fn(*Self) i32".to_string(),
        },
    )
}

fn position_violation(is_return: bool) -> Violation {
    let sig: FnSig = "fn(*Self) u8".parse().unwrap();
    let signature = Signature::function("get".into(), &sig.bind_self("C", Role::Candidate), true);
    let mismatch = PositionMismatch {
        index: usize::from(is_return),
        is_return,
        expected: TypeRef::named("i32"),
        found: if is_return {
            TypeRef::named("u8")
        } else {
            TypeRef::self_ref(Role::Candidate, 1)
        },
    };
    let slots = if is_return {
        vec![None, Some(mismatch.clone())]
    } else {
        vec![Some(mismatch.clone()), None]
    };
    let rendered = render_signature("get", &signature, &slots).unwrap().unwrap();
    Violation::new(
        "get".into(),
        FailureReason::PositionMismatch {
            mismatches: vec![mismatch],
            rendered,
        },
    )
}

#[test]
fn test_fast_tracer_stops_without_building() {
    let mut tracer = FastTracer::new();
    assert!(!tracer.failed());
    let keep_going = tracer.on_violation(|| panic!("fast tracer must not build violations"));
    assert!(!keep_going);
    assert!(tracer.failed());
}

#[test]
fn test_collecting_tracer_keeps_order() {
    let mut tracer = CollectingTracer::new();
    assert!(tracer.on_violation(|| missing("a")));
    assert!(tracer.on_violation(|| missing("b")));
    let names: Vec<String> = tracer
        .violations()
        .iter()
        .map(|v| v.member.to_string())
        .collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(tracer.into_violations().len(), 2);
}

#[test]
fn test_violation_kinds_and_codes() {
    let arity = Violation::new(
        "magic".into(),
        FailureReason::ArityMismatch {
            expected: 4,
            found: 3,
        },
    );
    assert_eq!(arity.kind(), ViolationKind::ArityMismatch);
    assert_eq!(arity.code(), codes::ARITY_MISMATCH);
    assert_eq!(arity.message(), "member 'magic': expected 4 parameter(s), found 3");

    assert_eq!(missing("next").kind(), ViolationKind::MissingMember);
    assert_eq!(
        missing("next").message(),
        "missing member 'next' of type 'fn(*Self) i32'"
    );

    let not_fn = Violation::new(
        "current".into(),
        FailureReason::NotAFunction {
            found: SignatureKind::Value,
        },
    );
    assert_eq!(not_fn.message(), "member 'current' must be a function, found a value");
    assert_eq!(not_fn.code(), codes::NOT_A_FUNCTION);
}

#[test]
fn test_position_mismatch_kind_depends_on_slots() {
    let param = position_violation(false);
    assert_eq!(param.kind(), ViolationKind::ParameterTypeMismatch);
    assert_eq!(param.message(), "member 'get' has mismatched parameter types");

    let ret = position_violation(true);
    assert_eq!(ret.kind(), ViolationKind::ReturnTypeMismatch);
    assert_eq!(ret.code(), codes::RETURN_TYPE_MISMATCH);
    assert_eq!(
        ret.rendered_text(),
        "member 'get' has a mismatched return type\n\
         fn get(*Self) u8\n\
         \x20             ^^\n\
         \x20             expected type 'i32', found 'u8'"
    );
}

#[test]
fn test_report_display_is_canonical() {
    let report = ConformanceReport {
        shape: "Iterable".into(),
        candidate: "Counter".into(),
        violations: vec![missing("next"), position_violation(true)],
    };
    let text = report.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "error[SC2000]: type 'Counter' does not conform to 'Iterable'",
            "  [SC2001] missing member 'next' of type 'fn(*Self) i32'",
            "  [SC2006] member 'get' has a mismatched return type",
            "      fn get(*Self) u8",
            "                    ^^",
            "                    expected type 'i32', found 'u8'",
        ]
    );

    let err = ConformanceError::Nonconforming(report.clone());
    assert_eq!(err.to_string(), text);
    assert_eq!(err.code(), Some(codes::TYPE_DOES_NOT_CONFORM));
    assert_eq!(err.violations().len(), 2);
}

#[test]
fn test_report_to_diagnostics() {
    let report = ConformanceReport {
        shape: "Iterable".into(),
        candidate: "Counter".into(),
        violations: vec![missing("next"), position_violation(false)],
    };
    let diagnostics = report.to_diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].code, codes::MISSING_MEMBER);
    assert_eq!(diagnostics[0].member.as_deref(), Some("next"));
    assert!(diagnostics[0].related_information.is_empty());
    assert_eq!(diagnostics[1].related_information.len(), 1);
    assert!(
        diagnostics[1].related_information[0]
            .message_text
            .starts_with("fn get(*Self) u8")
    );
}

#[test]
fn test_configuration_error_text() {
    let err = ConfigurationError::NonBehavioralShape {
        shape: "Iterable".into(),
        fields: vec!["count".into(), "total".into()],
    };
    assert_eq!(
        err.to_string(),
        "shape 'Iterable' must only declare behavior, but it stores 2 field(s): count, total"
    );
    assert_eq!(err.violation_kind(), Some(ViolationKind::NonBehavioralShape));

    let wrapped = ConformanceError::from(err.clone());
    assert!(wrapped.is_configuration());
    assert_eq!(wrapped.code(), Some(codes::NON_BEHAVIORAL_SHAPE));
    assert!(wrapped.to_string().starts_with("error[SC1001]: shape 'Iterable'"));
    assert!(wrapped.violations().is_empty());

    let diagnostics = wrapped.to_diagnostics("Counter");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].shape, "Iterable");
    assert_eq!(diagnostics[0].candidate, "Counter");
}

#[test]
fn test_duplicate_member_diagnostic_has_member() {
    let err = ConfigurationError::DuplicateMember {
        type_name: "Animal".into(),
        member: "speak".into(),
    };
    assert_eq!(err.code(), codes::DUPLICATE_MEMBER);
    assert_eq!(err.violation_kind(), None);
    assert_eq!(err.to_diagnostic("Dog").member.as_deref(), Some("speak"));
}
