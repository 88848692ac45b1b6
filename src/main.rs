// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, load the config, create an API
//   client and hand both to the command layer.
// - Returns `anyhow::Result` so any failure ends the process with a
//   message and a non-zero exit code.

use anyhow::Context;
use clap::Parser;
use pinboard_cli::{api::PinboardApi, cli::Cli, commands, config::Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log level comes from `LOGLEVEL` (e.g. LOGLEVEL=debug), warnings by default.
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("LOGLEVEL", "warn")).init();

    let config = Config::load(cli.config.as_deref())?;
    let api = PinboardApi::new(&config.auth_token).context("Failed to set up the API client")?;

    commands::run(&api, &config, cli.command)
}
