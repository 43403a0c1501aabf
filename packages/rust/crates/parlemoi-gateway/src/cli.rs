use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "parlemoi")]
#[command(about = "Parle-moi gateway: compassionate-listening chat, speech-to-text and text-to-speech API.")]
pub(crate) struct Cli {
    /// Override config directory (holds `parlemoi/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server. Default bind: 0.0.0.0:3000 (or 0.0.0.0:$PORT)
    Serve {
        /// Listen address (e.g. 127.0.0.1:3000); takes precedence over --port
        #[arg(long)]
        bind: Option<String>,

        /// Listen port on 0.0.0.0
        #[arg(long)]
        port: Option<u16>,

        /// Allowed CORS origins (comma-separated). Empty or `*` = any origin.
        #[arg(long)]
        allowed_origins: Option<String>,

        /// Directory for in-flight audio uploads (default: uploads)
        #[arg(long)]
        upload_dir: Option<PathBuf>,

        /// Debug logging for the gateway and HTTP tracing.
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,
    },
    /// Print the persona instruction for a language and exit.
    Prompt {
        /// Language tag (`fr` or `en`; anything else falls back to French)
        #[arg(long, default_value = "fr")]
        language: String,
    },
}
