use clap::Parser;

use sqlab::{
    adapters,
    cli::Args,
    core::connection::ConnectionPool,
    error::{AppError, AppResult},
    logging,
};

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    rt.block_on(async move {
        let pool = ConnectionPool::open(&args.db, args.connection_limit, args.busy_timeout_ms)?;
        if args.browse.is_some() || args.browse_query.is_some() {
            adapters::browse::run(&args, pool).await
        } else {
            adapters::bridge::run(args, pool).await
        }
    })
}
