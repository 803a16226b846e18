//! `tui` — launch the interactive topology explorer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use rabbitscope_api::{ManagementClient, TransportConfig};
use rabbitscope_core::ViewModel;
use rabbitscope_tui::App;

use crate::cli::{GlobalOpts, TuiArgs};
use crate::error::CliError;

pub async fn run(args: TuiArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = ManagementClient::new(&global.uri, &TransportConfig::default())?;
    let vm = Arc::new(ViewModel::new(client, global.filter()));

    // The startup fetch is fatal: a broker that is down aborts the
    // session before any terminal state changes. Background refresh
    // failures later are only logged.
    vm.fetch_topology().await?;

    let cancel = CancellationToken::new();

    // Ctrl+C funnels through the same cancellation token the refresh
    // loop and the event loop observe.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    // Panic hooks must be installed before entering the terminal.
    rabbitscope_tui::install_hooks().map_err(|e| CliError::Terminal {
        message: format!("{e:#}"),
    })?;

    let mut app = App::new(vm, args.refresh_interval, cancel);
    app.run().await.map_err(|e| CliError::Terminal {
        message: format!("{e:#}"),
    })
}
