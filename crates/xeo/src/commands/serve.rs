//! `xeo serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use xeo_config::{CliSettings, Config};
use xeo_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover xeo.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// URL prefix documents are mounted under (overrides config).
    #[arg(long)]
    base_path: Option<String>,

    /// HTTP origin to fetch content from when missing locally (overrides config).
    #[arg(long, env = "XEO_FALLBACK_URL")]
    fallback_url: Option<String>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            content_dir: self.content_dir,
            base_path: self.base_path,
            fallback_url: self.fallback_url,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Content directory: {}",
            config.content_resolved.root.display()
        ));
        output.info(&format!(
            "Settings: {}",
            config.content_resolved.settings_file
        ));
        match &config.content_resolved.fallback_url {
            Some(url) => output.info(&format!("Fallback origin: {url}")),
            None => output.info("Fallback origin: none"),
        }
        if !config.viewer.base_path.is_empty() {
            output.info(&format!("Base path: {}", config.viewer.base_path));
        }
        match &config.viewer.state_dir {
            Some(dir) => output.info(&format!("Scroll record: {}", dir.display())),
            None => output.info("Scroll record: in memory"),
        }

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config).await?;

        Ok(())
    }
}
