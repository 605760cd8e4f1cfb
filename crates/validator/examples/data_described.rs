//! Compiling schemas from JSON and validating an HTTP request with them

use std::sync::Arc;

use gatekeeper_validator::prelude::*;
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), CompileError> {
    let registry = Arc::new(FunctionRegistry::new());
    registry.register_predicate("isSlug", |value, _| {
        value
            .and_then(Value::as_str)
            .is_some_and(|s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
    });
    let compiler = RuleCompiler::new(registry);

    let schema = HttpSchema::new()
        .params(compiler.compile_schema(&json!({"slug": {"custom": "isSlug"}}))?)
        .query(compiler.compile_schema(&json!({"page": {"isNumeric": true, "required": false}}))?)
        .body(compiler.compile_schema(&json!({
            "title": {"required": true, "maxLength": 80},
            "tags": {"eachItem": {"minLength": 2}, "options": {"required": false}}
        }))?);

    let request = HttpRequest::new()
        .with_params(json!({"slug": "Hello World"}))
        .with_query(HttpRequest::query_from_str("page=two"))
        .with_body(json!({"title": "Hello", "tags": ["rust", "x"]}));

    let result = http_validate(&request, &schema, &HttpValidateOptions::default()).await;
    match serde_json::to_string_pretty(&result) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("cannot render result: {e}"),
    }
    Ok(())
}
