mod handler;
mod io;
mod protocol;

use std::io::{BufRead, Write};

use crate::{cli::Args, core::connection::ConnectionPool, error::AppResult};

pub use handler::BridgeHandler;
pub use io::NdjsonIo;
pub use protocol::{BridgeRequest, BridgeResponse, PROTOCOL_VERSION};

/// Serves the bridge over stdin/stdout until stdin closes.
pub async fn run(args: Args, pool: ConnectionPool) -> AppResult<()> {
    tracing::info!(db = %pool.db_path().display(), "bridge listening on stdio");
    let mut io = NdjsonIo::stdio();
    serve(&mut io, &BridgeHandler::new(args, pool)).await
}

/// Request loop: one response line per non-blank request line, in order.
pub async fn serve<R: BufRead, W: Write>(io: &mut NdjsonIo<R, W>, handler: &BridgeHandler) -> AppResult<()> {
    loop {
        let Some(line) = io.read_line()? else { break };
        if line.is_empty() {
            continue;
        }

        let req: BridgeRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable request line");
                io.protocol_error(e.to_string())?;
                continue;
            }
        };

        let resp = handler.handle(req).await;
        io.write_json_line(&resp)?;
    }

    tracing::info!("input closed; bridge stopping");
    Ok(())
}
