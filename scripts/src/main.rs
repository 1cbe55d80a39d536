use clap::Parser;
use scripts::{
    artifacts::Artifacts, cli::Cli, commands::DeployContext, errors::ScriptError,
    utils::setup_client, verify::Verifier,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // Variables set in a local `.env` fill in arguments not given on the command line
    dotenvy::dotenv().ok();

    let Cli {
        network,
        rpc_url,
        priv_key,
        artifacts,
        deployments,
        etherscan_key,
        no_verify,
        forge,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rpc_url = network.rpc_url(rpc_url.as_deref());
    let client = setup_client(&priv_key, &rpc_url, network).await?;

    let ctx = DeployContext {
        client,
        artifacts: Artifacts::new(artifacts),
        verifier: Verifier::new(network, etherscan_key, !no_verify).with_forge(forge),
        deployments,
    };

    command.run(ctx).await.inspect_err(|e| error!("{e}"))
}
