//! Integration tests for text schema validation.

use assay::{AnySchema, Meta, MetaValue, Options, Rule, Schema, Value};
use serde_json::json;

/// Helper to extract the success value from a Validation
fn unwrap_success<T, E: std::fmt::Debug>(v: stillwater::Validation<T, E>) -> T {
    v.into_result().unwrap()
}

/// Helper to extract the error value from a Validation
fn unwrap_failure<T, E>(v: stillwater::Validation<T, E>) -> E
where
    T: std::fmt::Debug,
{
    v.into_result().unwrap_err()
}

fn check(schema: &impl AnySchema, value: serde_json::Value) -> stillwater::Validation<Value, assay::ValidationError> {
    schema.validate_any(&Value::from(value), Options::default())
}

#[test]
fn test_schema_text_factory() {
    let schema = Schema::text();
    assert!(check(&schema, json!("test")).is_success());
}

#[test]
fn test_min_rejects_short_strings() {
    let schema = Schema::text().min(5);

    // Exactly 5 characters
    assert_eq!(unwrap_success(check(&schema, json!("hello"))), Value::from("hello"));

    let errors = unwrap_failure(check(&schema, json!("test")));
    assert_eq!(errors.first().code, "text.min");
    assert_eq!(errors.first().message, "too short");
    assert_eq!(errors.first().meta.get("min"), Some(&MetaValue::UInt(5)));
    assert_eq!(errors.first().meta.get("actual"), Some(&MetaValue::UInt(4)));
}

#[test]
fn test_max_and_len_count_characters() {
    let schema = Schema::text().max(5);
    assert!(check(&schema, json!("héllo")).is_success());
    assert!(check(&schema, json!("héllo!")).is_failure());

    let exact = Schema::text().len(3);
    assert!(check(&exact, json!("abc")).is_success());
    let errors = unwrap_failure(check(&exact, json!("ab")));
    assert_eq!(errors.first().code, "text.len");
}

#[test]
fn test_type_mismatch() {
    let errors = unwrap_failure(check(&Schema::text(), json!(42)));
    let issue = errors.first();
    assert_eq!(issue.code, "text.type");
    assert_eq!(issue.message, "expected string, got number");
    assert_eq!(issue.meta.get("expected"), Some(&MetaValue::Text("string".into())));
    assert_eq!(issue.meta.get("actual"), Some(&MetaValue::Text("number".into())));
    assert!(issue.path.is_root());
}

#[test]
fn test_error_before_rules_sets_type_message() {
    let schema = Schema::text().error("name must be text").min(1);
    let errors = unwrap_failure(check(&schema, json!(true)));
    assert_eq!(errors.first().message, "name must be text");
}

#[test]
fn test_optional_missing_and_null_succeed() {
    let schema = Schema::text().min(3);
    assert_eq!(
        unwrap_success(schema.validate_any(&Value::Missing, Options::default())),
        Value::Missing
    );
    assert_eq!(unwrap_success(check(&schema, json!(null))), Value::Null);
}

#[test]
fn test_required_and_non_nullable() {
    let schema = Schema::text().required();
    let errors = unwrap_failure(schema.validate_any(&Value::Missing, Options::default()));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().code, "text.required");
    assert_eq!(errors.first().message, "is required");

    // Null counts as present unless the schema is non-nullable.
    assert!(check(&schema, json!(null)).is_success());
    let strict = Schema::text().required().non_nullable();
    let errors = unwrap_failure(check(&strict, json!(null)));
    assert_eq!(errors.first().code, "text.required");
}

#[test]
fn test_default_substitution_precedes_checks() {
    let schema = Schema::text().default("x").min(1);
    assert_eq!(
        unwrap_success(schema.validate_any(&Value::Missing, Options::default())),
        Value::from("x")
    );

    let computed = Schema::text().default_with(|| "generated".to_string()).max(3);
    let errors = unwrap_failure(computed.validate_any(&Value::Missing, Options::default()));
    assert_eq!(errors.first().code, "text.max");
}

#[test]
fn test_pattern() {
    let schema = Schema::text().pattern(r"^\d{3}-\d{4}$");
    assert!(check(&schema, json!("555-1234")).is_success());

    let errors = unwrap_failure(check(&schema, json!("5551234")));
    assert_eq!(errors.first().code, "text.pattern");
    assert_eq!(
        errors.first().meta.get("pattern"),
        Some(&MetaValue::Text(r"^\d{3}-\d{4}$".into()))
    );
}

#[test]
fn test_invalid_pattern_is_reported_on_use() {
    let schema = Schema::text().pattern("(unclosed").min(1);
    assert!(schema.construction_error().is_some());

    let errors = unwrap_failure(check(&schema, json!("anything")));
    assert_eq!(errors.codes(), vec!["schema.invalid"]);
}

#[test]
fn test_one_of() {
    let schema = Schema::text().one_of(["red", "green", "blue"]);
    assert!(check(&schema, json!("green")).is_success());

    let errors = unwrap_failure(check(&schema, json!("Green")));
    assert_eq!(errors.first().code, "text.one_of");
    assert_eq!(
        errors.first().meta.get("allowed"),
        Some(&MetaValue::Text("red, green, blue".into()))
    );
}

#[test]
fn test_email() {
    let schema = Schema::text().email();
    assert!(check(&schema, json!("ops@example.com")).is_success());
    assert!(check(&schema, json!("first.last+tag@sub.example.org")).is_success());

    for bad in ["plainaddress", "@example.com", "user@", "user@localhost"] {
        let errors = unwrap_failure(check(&schema, json!(bad)));
        assert_eq!(errors.first().code, "text.email", "input {:?}", bad);
        assert_eq!(errors.first().message, "invalid email");
    }
}

#[test]
fn test_url_requires_host_but_uri_does_not() {
    let url = Schema::text().url();
    let uri = Schema::text().uri();

    assert!(check(&url, json!("https://example.com/path?q=1")).is_success());
    assert!(check(&url, json!("mailto:ops@example.com")).is_failure());
    assert!(check(&url, json!("/relative/path")).is_failure());

    assert!(check(&uri, json!("mailto:ops@example.com")).is_success());
    assert!(check(&uri, json!("urn:isbn:0451450523")).is_success());
    let errors = unwrap_failure(check(&uri, json!("not a uri")));
    assert_eq!(errors.first().code, "text.uri");
}

#[test]
fn test_uuid_requires_hyphenated_form() {
    let schema = Schema::text().uuid();
    assert!(check(&schema, json!("550e8400-e29b-41d4-a716-446655440000")).is_success());
    assert!(check(&schema, json!("550e8400e29b41d4a716446655440000")).is_failure());
    assert!(check(&schema, json!("550e8400-e29b-41d4-a716-44665544000g")).is_failure());
}

#[test]
fn test_cidr() {
    let schema = Schema::text().cidr();
    assert!(check(&schema, json!("10.0.0.0/8")).is_success());
    assert!(check(&schema, json!("2001:db8::/32")).is_success());
    assert!(check(&schema, json!("10.0.0.0/33")).is_failure());
    assert!(check(&schema, json!("10.0.0.0")).is_failure());
    assert!(check(&schema, json!("10.0.0.0/+8")).is_failure());
}

#[test]
fn test_digests() {
    let md5 = Schema::text().md5();
    assert!(check(&md5, json!("d41d8cd98f00b204e9800998ecf8427e")).is_success());
    let errors = unwrap_failure(check(&md5, json!("d41d8cd98f00b204e9800998ecf8427")));
    assert_eq!(errors.first().code, "text.md5");
    assert_eq!(errors.first().meta.get("size"), Some(&MetaValue::UInt(16)));

    let sha1 = Schema::text().sha1();
    assert!(check(&sha1, json!("da39a3ee5e6b4b0d3255bfef95601890afd80709")).is_success());
    assert!(check(&sha1, json!("zz39a3ee5e6b4b0d3255bfef95601890afd80709")).is_failure());

    let sha224 = Schema::text().sha224();
    assert!(check(&sha224, json!("a".repeat(56))).is_success());
    assert!(check(&sha224, json!("a".repeat(64))).is_failure());

    let sha384 = Schema::text().sha384();
    assert!(check(&sha384, json!("0".repeat(96))).is_success());
    assert!(check(&sha384, json!("0".repeat(95))).is_failure());
}

#[test]
fn test_substring_rules() {
    let schema = Schema::text()
        .starts_with("sk_")
        .ends_with("_live")
        .contains("key")
        .excludes("test");
    assert!(check(&schema, json!("sk_key_live")).is_success());

    let errors = unwrap_failure(check(&schema, json!("pk_test_dev")));
    assert_eq!(
        errors.codes(),
        vec![
            "text.starts_with",
            "text.ends_with",
            "text.contains",
            "text.excludes"
        ]
    );
    assert_eq!(errors.first().message, "must start with 'sk_'");
}

#[test]
fn test_transforms_apply_in_order() {
    let schema = Schema::text().trim().lowercase().min(3);
    assert_eq!(
        unwrap_success(check(&schema, json!("  HeLLo "))),
        Value::from("hello")
    );

    // The length check sees the trimmed value.
    let errors = unwrap_failure(check(&schema, json!("  ab  ")));
    assert_eq!(errors.first().code, "text.min");
}

#[test]
fn test_error_overrides_last_rule_message() {
    let schema = Schema::text()
        .min(3)
        .error("too short for a username")
        .max(10);
    let errors = unwrap_failure(check(&schema, json!("ab")));
    assert_eq!(errors.first().message, "too short for a username");

    let errors = unwrap_failure(check(&schema, json!("abcdefghijkl")));
    assert_eq!(errors.first().message, "too long");
}

#[test]
fn test_custom_rule() {
    let no_spaces = Rule::predicate("no_spaces", "username.spaces", "must not contain spaces", |s: &String| {
        if s.contains(' ') {
            Err(Meta::new().with("actual", s.as_str()))
        } else {
            Ok(())
        }
    });
    let schema = Schema::text().trim().rule(no_spaces);

    assert!(check(&schema, json!(" john ")).is_success());
    let errors = unwrap_failure(check(&schema, json!("john doe")));
    assert_eq!(errors.first().code, "username.spaces");
}

#[test]
fn test_collect_all_versus_stop_on_first() {
    let schema = Schema::text().min(10).email();

    let errors = unwrap_failure(check(&schema, json!("bad")));
    assert_eq!(errors.codes(), vec!["text.min", "text.email"]);

    let result = schema.validate_any(
        &Value::from("bad"),
        Options::new().stop_on_first_error(true),
    );
    assert_eq!(unwrap_failure(result).codes(), vec!["text.min"]);
}

#[test]
fn test_native_validate() {
    let schema = Schema::text().trim().min(1);
    assert_eq!(unwrap_success(schema.validate("  ok  ")), "ok");
    assert!(schema.validate("   ").is_failure());
}
