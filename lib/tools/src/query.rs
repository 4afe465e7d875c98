//! The built-in data-query tool.
//!
//! Talks to a toolbox service that executes read-only SQL on the data
//! warehouse. API-level failures are folded into an informative result
//! payload instead of an opaque error, so the model can tell the user
//! what went wrong.

use crate::error::ToolError;
use crate::registry::ToolExecutor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use threadrelay_ai::ToolDefinition;

/// Name under which the query tool is advertised to the model.
pub const QUERY_TOOL_NAME: &str = "executeQueryOnBigQuery";

/// Tool executor for warehouse queries over the toolbox HTTP contract.
#[derive(Debug, Clone)]
pub struct QueryTool {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Response shape of the toolbox query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// `SUCCESS` or an error status.
    pub status: String,
    /// Column names, present on success.
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    /// Result rows, also used to carry error detail entries.
    #[serde(default)]
    pub rows: Option<Vec<JsonValue>>,
}

impl QueryTool {
    /// Creates the tool against the toolbox service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            ToolError::ExecutionFailed {
                name: QUERY_TOOL_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ToolExecutor for QueryTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            QUERY_TOOL_NAME,
            "Executes a read-only SQL query on Google BigQuery and returns the results.",
        )
        .with_input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The BigQuery SQL query to execute."
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, input: &JsonValue) -> Result<String, ToolError> {
        let query = input
            .get("query")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ToolError::InvalidInput {
                name: QUERY_TOOL_NAME.to_string(),
                reason: "missing or blank required field 'query'".to_string(),
            })?;

        tracing::info!(%query, "executing toolbox query");
        let response = self
            .http
            .post(format!("{}/query-bigquery", self.base_url))
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout {
                        name: QUERY_TOOL_NAME.to_string(),
                    }
                } else {
                    ToolError::Transport {
                        name: QUERY_TOOL_NAME.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let outcome = if status.is_success() {
            response
                .json::<QueryResponse>()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    name: QUERY_TOOL_NAME.to_string(),
                    reason: format!("malformed toolbox response: {e}"),
                })?
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "toolbox API error");
            fold_api_error(status.as_u16(), body)
        };

        if !outcome.status.eq_ignore_ascii_case("SUCCESS") {
            tracing::warn!(status = %outcome.status, "toolbox returned non-success status");
        }
        Ok(format_response(&outcome))
    }
}

/// Folds a non-success HTTP status into an informative response so the
/// model still receives something it can explain.
fn fold_api_error(status_code: u16, body: String) -> QueryResponse {
    QueryResponse {
        status: format!("ERROR_API_{status_code}"),
        column_names: None,
        rows: Some(vec![serde_json::json!({
            "error_type": "API_ERROR",
            "status_code": status_code,
            "error_message": body,
        })]),
    }
}

/// Serializes a query outcome into the tool-result text representation.
///
/// The serialization is deterministic (object keys sort lexicographically)
/// and preserves status, column names, and rows on success; failures keep
/// the status plus any error detail carried in the rows.
fn format_response(response: &QueryResponse) -> String {
    let success = response.status.eq_ignore_ascii_case("SUCCESS")
        && response.column_names.is_some()
        && response.rows.is_some();

    let payload = if success {
        serde_json::json!({
            "status": response.status,
            "column_names": response.column_names,
            "rows": response.rows,
        })
    } else {
        let details = response
            .rows
            .as_ref()
            .and_then(|rows| rows.first())
            .and_then(|row| row.get("error_message"))
            .cloned();
        match details {
            Some(details) => serde_json::json!({
                "status": response.status,
                "message": "Tool execution failed, returned no data, or an error occurred.",
                "details": details,
            }),
            None => serde_json::json!({
                "status": response.status,
                "message": "Tool execution failed, returned no data, or an error occurred.",
            }),
        }
    };
    payload.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_success_preserves_all_parts() {
        let response = QueryResponse {
            status: "SUCCESS".to_string(),
            column_names: Some(vec!["total".to_string()]),
            rows: Some(vec![serde_json::json!({"total": 100})]),
        };
        let formatted = format_response(&response);
        let parsed: JsonValue = serde_json::from_str(&formatted).expect("valid json");
        assert_eq!(parsed["status"], "SUCCESS");
        assert_eq!(parsed["column_names"][0], "total");
        assert_eq!(parsed["rows"][0]["total"], 100);
    }

    #[test]
    fn format_is_deterministic() {
        let response = QueryResponse {
            status: "SUCCESS".to_string(),
            column_names: Some(vec!["a".to_string(), "b".to_string()]),
            rows: Some(vec![serde_json::json!({"b": 2, "a": 1})]),
        };
        assert_eq!(format_response(&response), format_response(&response));
    }

    #[test]
    fn format_failure_carries_status_and_details() {
        let response = fold_api_error(503, "service unavailable".to_string());
        let formatted = format_response(&response);
        let parsed: JsonValue = serde_json::from_str(&formatted).expect("valid json");
        assert_eq!(parsed["status"], "ERROR_API_503");
        assert_eq!(parsed["details"], "service unavailable");
        assert!(parsed["message"].as_str().unwrap().contains("failed"));
    }

    #[test]
    fn format_missing_data_is_a_failure() {
        let response = QueryResponse {
            status: "SUCCESS".to_string(),
            column_names: None,
            rows: None,
        };
        let formatted = format_response(&response);
        let parsed: JsonValue = serde_json::from_str(&formatted).expect("valid json");
        assert!(parsed.get("rows").is_none());
        assert!(parsed["message"].as_str().is_some());
    }

    #[test]
    fn definition_requires_query_field() {
        let tool = QueryTool::new("http://localhost:5000", Duration::from_secs(30))
            .expect("tool construction");
        let definition = tool.definition();
        assert_eq!(definition.name, QUERY_TOOL_NAME);
        let required: Vec<&str> = definition.required_fields().collect();
        assert_eq!(required, vec!["query"]);
    }
}
