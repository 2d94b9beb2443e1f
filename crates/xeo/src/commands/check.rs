//! `xeo check` command implementation.
//!
//! Loads site settings, follows every navigation entry through the page
//! pipeline and reports entries that never settle on content.

use std::path::PathBuf;

use clap::Args;
use xeo_config::{CliSettings, Config};
use xeo_server::server_config_from_config;
use xeo_site::{AuditReport, Severity, audit};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover xeo.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, no navigation is configured,
    /// or a redirect chain never settles.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Checking {}",
            config.content_resolved.root.display()
        ));

        let server_config = server_config_from_config(&config, String::new());
        let site = server_config.site(server_config.storage());
        let report = audit(&site);

        print_report(&output, &report);
        verdict(&report, &config.content_resolved.settings_file)
    }
}

fn print_report(output: &Output, report: &AuditReport) {
    for finding in &report.findings {
        match finding.severity() {
            Severity::Warning => output.warning(&format!("warning: {finding}")),
            Severity::Error => output.error(&format!("error: {finding}")),
        }
    }
    if report.configured {
        output.detail(&format!(
            "{} entries checked, {} warnings, {} errors",
            report.checked,
            report.count(Severity::Warning),
            report.count(Severity::Error)
        ));
    }
    if report.configured && report.findings.is_empty() {
        output.success("Navigation OK");
    }
}

fn verdict(report: &AuditReport, settings_file: &str) -> Result<(), CliError> {
    if !report.configured {
        return Err(CliError::Check(format!(
            "no navigation configured in {settings_file}"
        )));
    }
    if report.has_errors() {
        return Err(CliError::Check(format!(
            "{} navigation entries never settle on a page",
            report.count(Severity::Error)
        )));
    }
    Ok(())
}
