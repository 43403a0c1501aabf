//! parlemoi CLI: serve the gateway or print the persona prompt.
//!
//! Settings: `packages/conf/settings.yaml` merged with `<config home>/parlemoi/settings.yaml`.
//!
//! Logging: set `RUST_LOG=parlemoi_gateway=info` (or `warn`, `debug`) to see gateway logs on stderr.

mod cli;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parlemoi_gateway::{
    GatewayState, build_prompt, load_runtime_settings, run_http, set_config_home_override,
};

use crate::cli::{Cli, Command};
use crate::resolve::{ServeOverrides, resolve_gateway_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose on serve => debug (incl. tower_http); else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let verbose = matches!(&cli.command, Command::Serve { verbose: true, .. });
        EnvFilter::new(if verbose {
            "parlemoi_gateway=debug,tower_http=debug"
        } else {
            "parlemoi_gateway=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Serve {
            bind,
            port,
            allowed_origins,
            upload_dir,
            verbose: _,
        } => {
            let runtime_settings = load_runtime_settings();
            let config = resolve_gateway_config(
                ServeOverrides {
                    bind,
                    port,
                    allowed_origins,
                    upload_dir,
                },
                &runtime_settings,
            );
            if config.resolve_api_key().is_none() {
                tracing::warn!(
                    event = "gateway.config.missing_api_key",
                    "OPENAI_API_KEY is not set; provider calls will fail with 500"
                );
            }
            tracing::info!(
                event = "gateway.config.resolved",
                bind = %config.bind,
                api_base_url = %config.api_base_url,
                chat_model = %config.chat_model,
                upload_dir = %config.upload_dir.display(),
                history_max_exchanges = config.history_max_exchanges,
                "gateway configuration resolved"
            );
            let state = GatewayState::from_config(&config);
            run_http(state, &config.bind).await
        }
        Command::Prompt { language } => {
            println!("{}", build_prompt(Some(&language)));
            Ok(())
        }
    }
}
