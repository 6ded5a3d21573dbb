//! Integration tests for object schema validation.

use assay::{
    shape, AnySchema, FieldKind, Options, Schema, SchemaBuildError, ValidationError, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

fn unwrap_success<T, E: std::fmt::Debug>(v: stillwater::Validation<T, E>) -> T {
    v.into_result().unwrap()
}

fn unwrap_failure<T: std::fmt::Debug, E>(v: stillwater::Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

fn check(
    schema: &impl AnySchema,
    value: serde_json::Value,
) -> stillwater::Validation<Value, ValidationError> {
    schema.validate_any(&Value::from(value), Options::default())
}

fn user_schema() -> assay::ObjectSchema {
    Schema::object()
        .field("name", Schema::text().required().min(1))
        .field("email", Schema::text().required().email())
        .field("age", Schema::number::<u8>().max(150))
}

#[test]
fn test_valid_object() {
    let result = check(
        &user_schema(),
        json!({"name": "Alice", "email": "alice@example.com", "age": 30}),
    );
    assert!(result.is_success());
}

#[test]
fn test_accumulates_every_field_issue() {
    let errors = unwrap_failure(check(
        &user_schema(),
        json!({"name": "", "email": "nope", "age": 200}),
    ));
    assert_eq!(errors.paths(), vec!["name", "email", "age"]);
    assert_eq!(errors.codes(), vec!["text.min", "text.email", "number.max"]);
}

#[test]
fn test_required_absence_yields_one_issue() {
    let schema = Schema::object().field("name", Schema::text().required());
    let errors = unwrap_failure(check(&schema, json!({})));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().path.to_string(), "name");
    assert_eq!(errors.first().code, "text.required");
}

#[test]
fn test_object_presence() {
    let schema = Schema::object().required().field("id", Schema::number::<u64>());
    let errors = unwrap_failure(schema.validate_any(&Value::Missing, Options::default()));
    assert_eq!(errors.first().code, "object.required");

    assert!(check(&Schema::object(), json!(null)).is_success());
    let strict = Schema::object().required().non_nullable();
    assert_eq!(
        unwrap_failure(check(&strict, json!(null))).first().code,
        "object.required"
    );

    let errors = unwrap_failure(check(&Schema::object().error("expected a user"), json!([1])));
    assert_eq!(errors.first().code, "object.type");
    assert_eq!(errors.first().message, "expected a user");
}

#[test]
fn test_nested_objects_compose_paths() {
    let schema = Schema::object().field(
        "user",
        Schema::object().field(
            "address",
            Schema::object().field("city", Schema::text().required()),
        ),
    );
    let errors = unwrap_failure(check(&schema, json!({"user": {"address": {}}})));
    assert_eq!(errors.paths(), vec!["user.address.city"]);
}

#[test]
fn test_array_of_objects_path() {
    let schema = Schema::object().field(
        "users",
        Schema::array().items(Schema::object().field("name", Schema::text().required())),
    );
    let errors = unwrap_failure(check(
        &schema,
        json!({"users": [{"name": "a"}, {"name": "b"}, {}]}),
    ));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.paths(), vec!["users[2].name"]);
}

#[test]
fn test_output_omits_failed_and_absent_fields() {
    let schema = Schema::object()
        .field("name", Schema::text().trim())
        .field("age", Schema::number::<u8>())
        .field("nickname", Schema::text());

    let out = unwrap_success(check(&schema, json!({"name": "  Bo  ", "age": 40})));
    assert_eq!(out.to_json(), json!({"name": "Bo", "age": 40}));
}

#[test]
fn test_additional_properties() {
    let open = Schema::object().field("id", Schema::number::<u64>());
    assert_eq!(
        unwrap_success(check(&open, json!({"id": 1, "debug": true}))).to_json(),
        json!({"id": 1, "debug": true})
    );

    let closed = Schema::object()
        .field("id", Schema::number::<u64>())
        .additional_properties(false);
    let errors = unwrap_failure(check(&closed, json!({"id": 1, "debug": true})));
    assert_eq!(errors.paths(), vec!["debug"]);
    assert_eq!(errors.first().code, "object.unknown_field");
    assert_eq!(errors.first().message, "unknown field 'debug'");

    let typed = Schema::object().additional_properties(Schema::text().max(3));
    let errors = unwrap_failure(check(&typed, json!({"a": "abc", "b": "abcd"})));
    assert_eq!(errors.paths(), vec!["b"]);
}

#[test]
fn test_stop_on_first_error_between_fields() {
    let schema = Schema::object()
        .field("a", Schema::text().required())
        .field("b", Schema::number::<i32>().required());
    let input = Value::from(json!({}));

    assert_eq!(unwrap_failure(schema.validate_any(&input, Options::default())).len(), 2);
    let errors = unwrap_failure(schema.validate_any(&input, Options::new().stop_on_first_error(true)));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.paths(), vec!["a"]);
}

#[test]
fn test_redeclared_field_keeps_position() {
    let schema = Schema::object()
        .field("first", Schema::text())
        .field("second", Schema::text())
        .field("first", Schema::text().required());
    assert_eq!(schema.field_names(), vec!["first", "second"]);

    let errors = unwrap_failure(check(&schema, json!({})));
    assert_eq!(errors.paths(), vec!["first"]);
}

#[test]
fn test_build_reports_nested_errors() {
    let schema = Schema::object().field(
        "profile",
        Schema::object().field("code", Schema::text().pattern("[a-")),
    );
    let error = schema.clone().build().unwrap_err();
    assert!(error.to_string().starts_with("field 'profile': field 'code': invalid pattern"));

    let errors = unwrap_failure(check(&schema, json!({})));
    assert_eq!(errors.codes(), vec!["schema.invalid"]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Signup {
    email: String,
    age: u32,
    tags: Vec<String>,
    referrer: Option<String>,
}

shape!(Signup {
    "email": Text,
    "age": Number,
    "tags": Array,
    "referrer": Text,
});

fn signup_schema() -> assay::ObjectSchema<Signup> {
    Schema::object_of::<Signup>()
        .field("email", Schema::text().required().trim().lowercase().email())
        .field("age", Schema::number::<u32>().required().min(13))
        .field("tags", Schema::array().items(Schema::text().min(1)).max(5))
        .field("referrer", Schema::text().url())
}

#[test]
fn test_shape_rejects_kind_mismatch() {
    let schema = Schema::object_of::<Signup>().field("age", Schema::text());
    assert_eq!(
        schema.build().unwrap_err(),
        SchemaBuildError::KindMismatch {
            field: "age".to_string(),
            declared: FieldKind::Number,
            attached: FieldKind::Text,
        }
    );
}

#[test]
fn test_shape_rejects_unknown_field() {
    let schema = Schema::object_of::<Signup>()
        .field("emial", Schema::text())
        .field("age", Schema::text());
    // The first construction error wins.
    assert_eq!(
        schema.build().unwrap_err(),
        SchemaBuildError::UnknownField("emial".to_string())
    );
}

#[test]
fn test_typed_validate_returns_native_value() {
    let schema = signup_schema().build().unwrap();
    let input = Signup {
        email: "  Ann@Example.COM ".to_string(),
        age: 30,
        tags: vec!["rust".to_string()],
        referrer: None,
    };
    let validated = unwrap_success(schema.validate(&input));
    assert_eq!(validated.email, "ann@example.com");
    assert_eq!(validated.referrer, None);
}

#[test]
fn test_typed_validate_reports_issues() {
    let schema = signup_schema();
    let input = Signup {
        email: "not-an-email".to_string(),
        age: 9,
        tags: vec![String::new()],
        referrer: Some("ftp-less".to_string()),
    };
    let errors = unwrap_failure(schema.validate(&input));
    assert_eq!(errors.paths(), vec!["email", "age", "tags[0]", "referrer"]);
}
