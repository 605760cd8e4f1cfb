//! Schemas compiled from plain data, and entity validation on top of them.

use std::sync::Arc;

use gatekeeper_validator::compile::{FunctionKind, RuleDescription, SchemaDescription};
use gatekeeper_validator::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn registry() -> Arc<FunctionRegistry> {
    let registry = FunctionRegistry::new();
    registry.register_predicate("isBusiness", |_, ctx| {
        ctx.lookup("accountType").and_then(Value::as_str) == Some("business")
    });
    registry.register_predicate("isVerified", |_, ctx| ctx.lookup("verified") == Some(&json!(true)));
    registry.register_predicate("explodes", |_, _| panic!("must not be evaluated"));
    registry.register_predicate("isSlug", |value, _| {
        value
            .and_then(Value::as_str)
            .is_some_and(|s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
    });
    registry.register_dependency("after", |start, end, _| {
        match (start.and_then(Value::as_i64), end.and_then(Value::as_i64)) {
            (Some(start), Some(end)) => end > start,
            _ => false,
        }
    });
    Arc::new(registry)
}

fn compiler() -> RuleCompiler {
    RuleCompiler::new(registry())
}

async fn run(schema: &Value, data: &Value) -> ValidationResult {
    let schema = compiler().compile_schema(schema).unwrap();
    validate(Some(data), Some(&schema), None, &ValidateOptions::default()).await
}

fn paths(result: &ValidationResult) -> Vec<String> {
    result.errors().iter().map(ValidationError::dotted_path).collect()
}

// ============================================================================
// COMPILATION
// ============================================================================

#[tokio::test]
async fn signup_schema_from_data() {
    let schema = json!({
        "username": {"required": true, "minLength": 3, "maxLength": 20},
        "email": {"email": true},
        "age": {"min": 18, "messageId": "validation.adult"},
        "slug": {"custom": "isSlug", "required": false},
        "tags": {"eachItem": {"minLength": 2}, "options": {"required": false}}
    });
    let data = json!({
        "username": "al",
        "email": "al@example.com",
        "age": 12,
        "slug": "Not A Slug",
        "tags": ["ok", "x"]
    });

    let result = run(&schema, &data).await;
    assert_eq!(paths(&result), ["username", "age", "slug", "tags.1"]);
    assert_eq!(result.errors()[1].message_id(), Some("validation.adult"));

    let valid = json!({"username": "alice", "email": "alice@example.com", "age": 30});
    assert!(run(&schema, &valid).await.is_pass());
}

#[tokio::test]
async fn nested_schemas_from_data() {
    let address = json!({"street": {"required": true}, "city": {"required": true}});
    let schema = json!({
        "address": {"nested": "", "schema": address.clone()},
        "alternateAddresses": {
            "eachItem": {"nested": "", "schema": address},
            "options": {"required": false}
        }
    });
    let data = json!({
        "address": {"street": "Main St"},
        "alternateAddresses": [{"street": "A", "city": "B"}, {"street": "C"}]
    });

    let result = run(&schema, &data).await;
    assert_eq!(paths(&result), ["address.city", "alternateAddresses.1.city"]);
}

#[rstest]
#[case::gte(json!({"gte": 5}), json!(5), true)]
#[case::gt(json!({"gt": 5}), json!(5), false)]
#[case::lt(json!({"lt": 5}), json!(4), true)]
#[case::eq(json!({"eq": "a"}), json!("a"), true)]
#[case::neq(json!({"neq": "a"}), json!("a"), false)]
#[case::in_list(json!({"in": ["a", "b"]}), json!("c"), false)]
#[case::datatype(json!({"datatype": "uuid"}), json!("67e55044-10b1-426f-9247-bb680e5fe0c8"), true)]
#[case::array(json!([{"minLength": 2}, {"matches": "^[a-z]+$"}]), json!("ab"), true)]
#[case::safe_size(json!({"safeSizeJSON": 4}), json!("abc"), false)]
#[case::object_values(json!({"objectValues": {"min": 0}}), json!({"a": 1, "b": -1}), false)]
#[tokio::test]
async fn rule_aliases(#[case] description: Value, #[case] value: Value, #[case] passes: bool) {
    let rule = compiler().compile_rule(&description).unwrap();
    let result = rule.validate(Some(&value), &Context::empty()).await;
    assert_eq!(result.is_pass(), passes);
}

#[test]
fn descriptions_render_canonically() {
    let description = RuleDescription::parse(&json!({"gte": 1, "lte": 9, "message": "Out of range"})).unwrap();
    assert_eq!(
        description.to_value(),
        json!({"allOf": [
            {"min": 1, "message": "Out of range"},
            {"max": 9, "message": "Out of range"}
        ]})
    );

    let schema = SchemaDescription::parse(&json!({"age": {"gte": 18}})).unwrap();
    assert_eq!(schema.to_value(), json!({"fields": {"age": {"min": 18}}}));
}

#[rstest]
#[case::unknown_rule(json!({"a": {"noSuchRule": 1}}), "a.noSuchRule")]
#[case::bad_length(json!({"a": {"minLength": "three"}}), "a.minLength")]
#[case::bad_type(json!({"a": {"datatype": "colour"}}), "a.datatype")]
#[case::nested_deep(json!({"a": {"nested": "", "schema": {"b": {"custom": "missing"}}}}), "a.schema.b.custom")]
#[case::mixed(json!({"a": {"when": "isBusiness", "minLength": 2}}), "a")]
fn bad_descriptions_are_rejected(#[case] schema: Value, #[case] location: &str) {
    let error = compiler().compile_schema(&schema).unwrap_err();
    assert_eq!(error.location(), location, "{error}");
}

#[test]
fn custom_must_name_a_rule_or_predicate() {
    let error = compiler().compile_rule(&json!({"custom": "after"})).unwrap_err();
    assert!(matches!(
        error,
        CompileError::WrongFunctionKind { expected: FunctionKind::Rule, found: FunctionKind::Dependency, .. }
    ));
}

// ============================================================================
// CONDITIONS AND DEPENDENCIES
// ============================================================================

#[tokio::test]
async fn conditional_fields_from_data() {
    let schema = json!({
        "fields": {
            "vatNumber": {"when": "business", "rule": {"required": true}},
            "invoiceEmail": {"whenAll": ["business", "isVerified"], "rule": {"email": true}},
            "nickname": {"whenNot": "business", "rule": {"minLength": 2}}
        },
        "conditions": {"business": "isBusiness"}
    });

    let business = json!({"accountType": "business", "verified": true, "invoiceEmail": "nope"});
    assert_eq!(paths(&run(&schema, &business).await), ["vatNumber", "invoiceEmail"]);

    let personal = json!({"accountType": "personal", "nickname": "x"});
    assert_eq!(paths(&run(&schema, &personal).await), ["nickname"]);
}

#[tokio::test]
async fn compiled_when_all_short_circuits() {
    let schema = json!({"field": {"whenAll": ["isBusiness", "explodes"], "rule": {"required": true}}});
    let result = run(&schema, &json!({"accountType": "personal"})).await;
    assert!(result.is_pass());
}

#[tokio::test]
async fn dependencies_from_data() {
    let schema = json!({
        "confirmPassword": {"dependsOn": "password", "condition": "equals", "message": "Passwords do not match"},
        "endsAt": {"dependsOn": "startsAt", "condition": "after"}
    });
    let data = json!({"password": "a", "confirmPassword": "b", "startsAt": 10, "endsAt": 5});

    let result = run(&schema, &data).await;
    assert_eq!(paths(&result), ["confirmPassword", "endsAt"]);
    assert_eq!(result.errors()[0].message, "Passwords do not match");
    assert_eq!(result.errors()[1].expected, Some(json!(10)));
}

#[tokio::test]
async fn registry_changes_apply_to_later_compilations() {
    let compiler = compiler();
    let description = json!({"code": {"custom": "isCode"}});
    assert!(compiler.compile_schema(&description).is_err());

    compiler
        .registry()
        .register_predicate("isCode", |value, _| value.and_then(Value::as_str).is_some_and(|s| s.len() == 6));
    let schema = compiler.compile_schema(&description).unwrap();
    let result = validate(Some(&json!({"code": "12345"})), Some(&schema), None, &ValidateOptions::default()).await;
    assert_eq!(paths(&result), ["code"]);
}

// ============================================================================
// ENTITY VALIDATION
// ============================================================================

fn user_update() -> EntityValidationRequest {
    EntityValidationRequest::new("user")
        .section(
            Section::Actor,
            Some(json!({"role": "guest"})),
            json!({"role": {"oneOf": ["admin", "editor"]}}),
        )
        .section(
            Section::Input,
            Some(json!({"age": 16, "email": "ada@example.com"})),
            json!({"age": {"min": 18}, "email": {"email": true}}),
        )
}

#[tokio::test]
async fn entity_errors_are_sectioned_and_tagged() {
    let result = validate_entity(&compiler(), &user_update()).await.unwrap();

    assert!(!result.pass);
    let paths: Vec<_> = result.errors.iter().map(ValidationError::dotted_path).collect();
    assert_eq!(paths, ["actor.role", "input.age"]);
    assert_eq!(
        result.errors[1].message_ids,
        ["validation.entity.user.age.min", "validation.min"]
    );
}

#[tokio::test]
async fn entity_fail_fast_stops_after_first_section() {
    let request = user_update()
        .with_options(ValidateOptions::fail_fast())
        .stop_on_first_section_failure(true);
    let result = validate_entity(&compiler(), &request).await.unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, ["actor", "role"]);
}

#[tokio::test]
async fn entity_fail_fast_alone_still_checks_every_section() {
    let request = user_update().with_options(ValidateOptions::fail_fast());
    let result = validate_entity(&compiler(), &request).await.unwrap();

    let paths: Vec<_> = result.errors.iter().map(ValidationError::dotted_path).collect();
    assert_eq!(paths, ["actor.role", "input.age"]);
}

#[tokio::test]
async fn entity_ids_name_the_rule_that_failed() {
    let request = EntityValidationRequest::new("user").section(
        Section::Input,
        Some(json!({
            "age": 16,
            "bio": "far too long",
            "nickname": 7,
            "email": "nope",
            "backupEmail": "nope"
        })),
        json!({
            "age": {"min": 18, "messageId": "errors.tooYoung"},
            "bio": {"safeSizeString": 4},
            "nickname": {"datatype": "string"},
            "email": {"email": true},
            "backupEmail": {"datatype": "email"}
        }),
    );
    let result = validate_entity(&compiler(), &request).await.unwrap();

    let ids: Vec<_> = result.errors.iter().map(|e| e.message_ids[0].as_str()).collect();
    assert_eq!(
        ids,
        [
            "validation.entity.user.age.min",
            "validation.entity.user.bio.safeSizeString",
            "validation.entity.user.nickname.datatype",
            "validation.entity.user.email.email",
            "validation.entity.user.backupEmail.datatype",
        ]
    );
    assert!(result.errors[0].has_message_id("errors.tooYoung"));
}

#[tokio::test]
async fn entity_section_without_data_is_still_checked() {
    let request = EntityValidationRequest::new("order").section(
        Section::Record,
        None,
        json!({"id": {"required": true}}),
    );
    let result = validate_entity(&compiler(), &request).await.unwrap();
    assert_eq!(result.errors[0].path, ["record", "id"]);
}

#[tokio::test]
async fn entity_rules_see_the_caller_context() {
    let registry = registry();
    registry.register_predicate("sameTenant", |value, ctx| {
        value.is_some() && value == ctx.caller().and_then(|c| c.get("tenant"))
    });
    let compiler = RuleCompiler::new(registry);

    let request = EntityValidationRequest::new("invoice")
        .section(Section::Input, Some(json!({"tenant": "acme"})), json!({"tenant": {"custom": "sameTenant"}}))
        .with_context(json!({"tenant": "globex"}));

    let result = validate_entity(&compiler, &request).await.unwrap();
    assert_eq!(result.errors[0].message_ids[0], "validation.entity.invoice.tenant.custom");
}

#[tokio::test]
async fn entity_schema_errors_fail_the_call() {
    let request = EntityValidationRequest::new("user").section(
        Section::Record,
        None,
        json!({"id": {"matches": "("}}),
    );
    let error = validate_entity(&compiler(), &request).await.unwrap_err();
    assert!(matches!(error, CompileError::InvalidPattern { .. }));
}

#[tokio::test]
async fn entity_request_from_json() {
    let request: EntityValidationRequest = serde_json::from_value(json!({
        "entityName": "user",
        "operationName": "create",
        "entityValidations": {"input": {"age": {"min": 18}}},
        "input": {"age": 16},
        "collectErrors": false,
        "verboseErrors": false
    }))
    .unwrap();
    assert_eq!(request.operation_name.as_deref(), Some("create"));
    assert!(!request.options().collect_errors);

    let result = validate_entity(&compiler(), &request).await.unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"pass": false, "errors": [{"path": ["input", "age"], "message": "Value must be at least 18"}]})
    );
}

#[tokio::test]
async fn entity_request_overrides_from_json() {
    let request: EntityValidationRequest = serde_json::from_value(json!({
        "entityName": "user",
        "entityValidations": {"input": {"age": {"min": 18}}},
        "input": {"age": 16},
        "overriddenErrorMessages": {"validation.entity.user.age.min": "Adults only"}
    }))
    .unwrap();

    let result = validate_entity(&compiler(), &request).await.unwrap();
    assert_eq!(result.errors[0].message, "Adults only");
}

#[rstest]
#[case::old_entity_key(json!({"entity": "user", "input": {"age": 16}}))]
#[case::old_schemas_key(json!({"entityName": "user", "schemas": {"input": {"age": {"min": 18}}}}))]
#[case::nested_options(json!({"entityName": "user", "options": {"collectErrors": false}}))]
#[case::unknown_section(json!({"entityName": "user", "entityValidations": {"inputs": {}}}))]
#[case::missing_name(json!({"input": {"age": 16}}))]
fn misshapen_entity_requests_are_rejected(#[case] request: Value) {
    assert!(serde_json::from_value::<EntityValidationRequest>(request).is_err());
}
