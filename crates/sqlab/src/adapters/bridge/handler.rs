use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    cli::Args,
    core::{connection::ConnectionPool, limits::PageRequest, schema},
    error::{AppError, AppResult},
    rewrite,
};

use super::protocol::*;

pub struct BridgeHandler {
    args: Args,
    pool: ConnectionPool,
}

impl BridgeHandler {
    pub fn new(args: Args, pool: ConnectionPool) -> Self {
        Self { args, pool }
    }

    pub async fn handle(&self, req: BridgeRequest) -> BridgeResponse<Value> {
        if req.v != PROTOCOL_VERSION {
            return BridgeResponse::err(
                req.v,
                req.id,
                "INVALID_REQUEST",
                format!("unsupported protocol version: {}", req.v),
            );
        }

        tracing::debug!(id = %req.id, cmd = %req.cmd, "request");
        match self.dispatch(&req.cmd, req.payload).await {
            Ok(data) => BridgeResponse::ok(req.v, req.id, data),
            Err(e) => {
                tracing::warn!(id = %req.id, cmd = %req.cmd, error = %e, "request failed");
                BridgeResponse::err(req.v, req.id, e.code(), e.to_string())
            }
        }
    }

    async fn dispatch(&self, cmd: &str, payload: Value) -> AppResult<Value> {
        match cmd {
            "execute_query" => self.handle_execute_query(parse(payload)?).await,
            "query_page" => self.handle_query_page(parse(payload)?).await,
            "table_data" => self.handle_table_data(parse(payload)?).await,
            "list_tables" => self.handle_list_tables(parse_or_default(payload)?).await,
            "database_info" => Ok(serde_json::to_value(schema::database_info(self.pool.db_path()))?),
            "rewrite" => handle_rewrite(parse(payload)?),
            "check_solution" => self.handle_check_solution(parse(payload)?).await,
            other => Err(AppError::InvalidRequest(format!("unknown cmd: {other}"))),
        }
    }

    async fn handle_execute_query(&self, p: ExecuteQueryPayload) -> AppResult<Value> {
        if p.query.trim().is_empty() {
            return Err(AppError::InvalidRequest("Query cannot be empty".into()));
        }
        let conn = self.pool.get_connection().await?;
        let qr = conn.execute(p.query).await?;
        Ok(serde_json::to_value(qr.without_hash_columns())?)
    }

    async fn handle_query_page(&self, p: QueryPagePayload) -> AppResult<Value> {
        let page = self.page_request(p.offset.as_ref(), p.limit.as_ref());
        let conn = self.pool.get_connection().await?;
        let qr = conn.query_page(p.query, page).await?;
        Ok(serde_json::to_value(qr)?)
    }

    async fn handle_table_data(&self, p: TableDataPayload) -> AppResult<Value> {
        let page = self.page_request(p.offset.as_ref(), p.limit.as_ref());
        let conn = self.pool.get_connection().await?;
        let qr = conn.table_page(p.table, page).await?;
        Ok(serde_json::to_value(qr)?)
    }

    async fn handle_list_tables(&self, p: ListTablesPayload) -> AppResult<Value> {
        let conn = self.pool.get_connection().await?;
        let tables = conn.tables(p.include_system).await?;
        Ok(serde_json::to_value(TablesData { tables })?)
    }

    async fn handle_check_solution(&self, p: CheckSolutionPayload) -> AppResult<Value> {
        let page = self.page_request(None, p.limit.as_ref());
        let conn = self.pool.get_connection().await?;
        let checked = conn.check_solution(p.sql, p.formula, page).await?;
        Ok(serde_json::to_value(checked)?)
    }

    fn page_request(&self, offset: Option<&Value>, limit: Option<&Value>) -> PageRequest {
        PageRequest::coerce(offset, limit, self.args.page_size, self.args.max_rows)
    }
}

fn handle_rewrite(p: RewritePayload) -> AppResult<Value> {
    let sql = rewrite::add_formula_column(&p.sql, &p.formula);
    Ok(serde_json::to_value(RewriteData { sql })?)
}

fn parse<T: DeserializeOwned>(payload: Value) -> AppResult<T> {
    serde_json::from_value(payload).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

/// For commands whose payload is entirely optional: a missing payload arrives as null.
fn parse_or_default<T: DeserializeOwned + Default>(payload: Value) -> AppResult<T> {
    if payload.is_null() {
        Ok(T::default())
    } else {
        parse(payload)
    }
}
