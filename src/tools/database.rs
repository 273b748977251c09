//! `query_database`: lookups over a small in-memory dataset.
//!
//! The dataset is built on first use and never changes afterwards, so
//! concurrent queries all observe the same records.

use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::capability::{CapabilityDescriptor, CapabilityResult, ToolHandler};
use crate::error::HandlerError;

const DEFAULT_LIMIT: usize = 10;

/// The mock database tool.
#[derive(Debug, Default)]
pub struct DatabaseTool {
    tables: OnceLock<Value>,
}

impl DatabaseTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self, table: &str) -> &[Value] {
        self.tables
            .get_or_init(fixture)
            .get(table)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn select(&self, table: &str, filters: &Map<String, Value>, limit: usize) -> CapabilityResult {
        let all = self.records(table);
        let records: Vec<&Value> = all
            .iter()
            .filter(|record| matches_filters(record, filters))
            .take(limit)
            .collect();

        CapabilityResult::success(
            json!({
                "table": table,
                "records": records,
                "count": records.len(),
                "total": all.len(),
            }),
            format!("Retrieved {} records from {table}", records.len()),
        )
    }

    fn count(&self, table: &str, filters: &Map<String, Value>) -> CapabilityResult {
        let count = self
            .records(table)
            .iter()
            .filter(|record| matches_filters(record, filters))
            .count();

        CapabilityResult::success(
            json!({
                "table": table,
                "count": count,
                "filters": filters,
            }),
            format!("Counted {count} records in {table}"),
        )
    }

    fn search(&self, table: &str, filters: &Map<String, Value>, limit: usize) -> CapabilityResult {
        let term = filters.get("search").and_then(Value::as_str);
        let needle = term.map(str::to_lowercase);

        let records: Vec<&Value> = self
            .records(table)
            .iter()
            .filter(|record| needle.as_deref().map_or(true, |n| contains_term(record, n)))
            .take(limit)
            .collect();

        CapabilityResult::success(
            json!({
                "table": table,
                "searchTerm": term,
                "records": records,
                "count": records.len(),
            }),
            format!("Found {} records matching search", records.len()),
        )
    }
}

#[async_trait]
impl ToolHandler for DatabaseTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "query_database",
            "Query SQLite database for user data and analytics",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "query_type": {
                    "type": "string",
                    "enum": ["select", "count", "search"],
                    "description": "Type of database query"
                },
                "table": {
                    "type": "string",
                    "enum": ["users", "orders", "products"],
                    "description": "Database table to query"
                },
                "filters": {
                    "type": "object",
                    "description": "Filters to apply to the query",
                    "default": {}
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of records to return",
                    "default": DEFAULT_LIMIT
                }
            },
            "required": ["query_type", "table"]
        }))
    }

    async fn invoke(&self, arguments: Value) -> Result<CapabilityResult, HandlerError> {
        let query_type = required_str(&arguments, "query_type")?;
        let table = required_str(&arguments, "table")?;
        let empty = Map::new();
        let filters = arguments
            .get("filters")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let limit = arguments
            .get("limit")
            .and_then(Value::as_f64)
            .map_or(DEFAULT_LIMIT, |n| n.max(0.0) as usize);

        tracing::debug!(query_type, table, limit, "Executing database tool");

        match query_type {
            "select" => Ok(self.select(table, filters, limit)),
            "count" => Ok(self.count(table, filters)),
            "search" => Ok(self.search(table, filters, limit)),
            other => Err(HandlerError::new(format!("Unknown query type: {other}"))),
        }
    }
}

fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, HandlerError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::new(format!("Missing required parameter: {name}")))
}

/// Every filter key must be present on the record with an equal value.
fn matches_filters(record: &Value, filters: &Map<String, Value>) -> bool {
    filters
        .iter()
        .all(|(key, expected)| record.get(key).is_some_and(|actual| same_value(actual, expected)))
}

/// Strict equality where numbers compare by value, so `30` matches `30.0`.
fn same_value(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

/// Case-insensitive substring match against any field of the record.
fn contains_term(record: &Value, needle: &str) -> bool {
    record.as_object().is_some_and(|fields| {
        fields.values().any(|value| {
            let text = match value {
                Value::String(s) => s.to_lowercase(),
                other => other.to_string().to_lowercase(),
            };
            text.contains(needle)
        })
    })
}

fn fixture() -> Value {
    json!({
        "users": [
            { "id": 1, "name": "John Doe", "email": "john@example.com", "age": 30, "city": "New York" },
            { "id": 2, "name": "Jane Smith", "email": "jane@example.com", "age": 25, "city": "London" },
            { "id": 3, "name": "Bob Johnson", "email": "bob@example.com", "age": 35, "city": "Tokyo" }
        ],
        "orders": [
            { "id": 1, "user_id": 1, "product": "Laptop", "amount": 999.99, "date": "2024-01-15" },
            { "id": 2, "user_id": 2, "product": "Phone", "amount": 599.99, "date": "2024-01-16" },
            { "id": 3, "user_id": 1, "product": "Mouse", "amount": 29.99, "date": "2024-01-17" }
        ],
        "products": [
            { "id": 1, "name": "Laptop", "category": "Electronics", "price": 999.99, "stock": 50 },
            { "id": 2, "name": "Phone", "category": "Electronics", "price": 599.99, "stock": 100 },
            { "id": 3, "name": "Mouse", "category": "Accessories", "price": 29.99, "stock": 200 }
        ]
    })
}
