//! `generate` — fetch the topology once and write a PlantUML file.

use std::fs;

use tracing::info;

use rabbitscope_api::{ManagementClient, TransportConfig};
use rabbitscope_core::diagram;

use crate::cli::{GenerateArgs, GlobalOpts};
use crate::error::CliError;

pub async fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = ManagementClient::new(&global.uri, &TransportConfig::default())?;
    let options = global.to_options(client.base_url().as_str());

    info!(broker = %client.base_url(), "connecting to RabbitMQ");

    let topology = client.fetch_topology().await?;
    let topology = topology.filter(&options.filter);

    let plantuml = diagram::generate(&topology, &options);
    fs::write(&args.out, plantuml).map_err(|e| CliError::WriteFailed {
        path: args.out.display().to_string(),
        source: e,
    })?;

    info!(path = %args.out.display(), "output written");
    Ok(())
}
