//! Serve command.

use super::CommandResult;
use crate::GlobalArgs;
use daylog_sync_server::ServerConfig;
use std::net::SocketAddr;

/// Runs the entries server until Ctrl-C.
pub fn run(global: &GlobalArgs, bind: SocketAddr) -> CommandResult {
    let config = ServerConfig::new(bind).with_data_dir(global.data_dir.clone());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(daylog_sync_server::serve(config))?;
    Ok(())
}
