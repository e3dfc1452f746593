//! scanwatch - waits for the remote scan of the current commit and stages
//! its results for the CI artifact store

use clap::Parser;

mod cli;
mod client;
mod config;
mod context;
mod error;
mod output;
mod poll;
mod run;
mod stage;
mod upload;

use error::Result;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_logger(cli.debug);

    if let Err(err) = try_run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logger(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

async fn try_run(cli: cli::Cli) -> Result<()> {
    let ctx = context::RunContext::from_env()?;
    log::info!("Current event: {}", ctx.event_name);

    if !ctx.is_supported_event() {
        log::warn!(
            "This tool is available for branch push, pull_request and release events only; \
             skipping (event: {})",
            ctx.event_name
        );
        return Ok(());
    }

    let settings = config::Settings::from_cli(&cli);
    let api = client::DeepbitsClient::new(settings.api_base.clone())?;
    let sink = upload::ActionsArtifactClient::from_env()?;
    let outputs = output::OutputSink::from_env();

    run::run(&ctx, &api, &sink, &outputs, &settings).await
}
