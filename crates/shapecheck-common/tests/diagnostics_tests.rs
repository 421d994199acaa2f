use super::*;

#[test]
fn test_format_message_replaces_positional_args() {
    let text = format_message(diagnostic_messages::EXPECTED_FOUND, &["i32", "i64"]);
    assert_eq!(text, "expected type 'i32', found 'i64'");
}

#[test]
fn test_format_message_leaves_missing_args_untouched() {
    let text = format_message("{0} and {1}", &["a"]);
    assert_eq!(text, "a and {1}");
}

#[test]
fn test_every_code_has_a_template() {
    use diagnostic_codes::*;
    for code in [
        NON_BEHAVIORAL_SHAPE,
        NON_FUNCTION_SLOT,
        DUPLICATE_MEMBER,
        TOO_MANY_PARAMETERS,
        TYPE_DOES_NOT_CONFORM,
        MISSING_MEMBER,
        NOT_A_FUNCTION,
        NOT_A_NESTED_TYPE,
        ARITY_MISMATCH,
        PARAMETER_TYPE_MISMATCH,
        RETURN_TYPE_MISMATCH,
        DEFAULT_REDEFINED,
        MISSING_IMPLEMENTATION,
        INCOMPATIBLE_SLOT,
    ] {
        assert!(
            get_message_template(code).is_some(),
            "no template for code {code}"
        );
        assert_eq!(get_diagnostic_category(code), Some(DiagnosticCategory::Error));
    }
}

#[test]
fn test_unknown_code_has_no_template() {
    assert!(get_message_template(9999).is_none());
}

#[test]
fn test_diagnostic_builder_and_display_code() {
    let diag = Diagnostic::error("Iterable", "Counter", "missing member", 2001)
        .with_member("next")
        .with_related("next", "fn(*Self) i32");

    assert_eq!(diag.display_code(), "SC2001");
    assert_eq!(diag.member.as_deref(), Some("next"));
    assert_eq!(diag.related_information.len(), 1);
    assert_eq!(
        diag.related_information[0].category,
        DiagnosticCategory::Message
    );
}

#[test]
fn test_diagnostic_serializes_without_empty_fields() {
    let diag = Diagnostic::error("Iterable", "Counter", "boom", 2000);
    let json = serde_json::to_value(&diag).expect("diagnostic should serialize");

    assert_eq!(json["category"], "error");
    assert_eq!(json["code"], 2000);
    assert!(json.get("member").is_none());
    assert!(json.get("related_information").is_none());
}
