//! Basic usage example for gatekeeper-validator

use gatekeeper_validator::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() {
    let schema = ValidationSchema::new()
        .condition("isBusiness", |_, ctx| {
            ctx.lookup("accountType").and_then(|v| v.as_str()) == Some("business")
        })
        .field("username", required().and(min_length(3)).and(max_length(20)))
        .field("email", email())
        .field("age", min(18))
        .conditional("vatNumber", when(required(), "isBusiness"));

    let data = json!({
        "username": "al",
        "email": "al@example.com",
        "age": 16,
        "accountType": "business"
    });

    let result = validate(Some(&data), Some(&schema), None, &ValidateOptions::default()).await;
    if result.is_pass() {
        println!("✓ signup is valid");
    } else {
        for error in result.errors() {
            println!("✗ {}: {}", error.dotted_path(), error.message);
        }
    }
}
