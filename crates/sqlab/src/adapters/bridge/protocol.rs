use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeRequest {
    pub v: u32,
    pub id: String,
    pub cmd: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct BridgeResponse<T> {
    pub v: u32,
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(v: u32, id: String, data: T) -> Self {
        Self {
            v,
            id,
            status: "ok",
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(v: u32, id: String, code: &'static str, error: String) -> Self {
        Self {
            v,
            id,
            status: "error",
            data: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

// Payloads. `offset` and `limit` stay raw: clients send numbers or strings and both are
// coerced, never rejected.

#[derive(Debug, Deserialize)]
pub struct ExecuteQueryPayload {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryPagePayload {
    pub query: String,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TableDataPayload {
    pub table: String,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTablesPayload {
    #[serde(default)]
    pub include_system: bool,
}

#[derive(Debug, Deserialize)]
pub struct RewritePayload {
    pub sql: String,
    pub formula: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckSolutionPayload {
    pub sql: String,
    pub formula: String,
    #[serde(default)]
    pub limit: Option<Value>,
}

// Response data

#[derive(Debug, Serialize)]
pub struct TablesData {
    pub tables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteData {
    pub sql: String,
}
