//! Install command - resolve, classify and download a modpack.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use console::style;
use packfetch::config::ConfigFile;
use packfetch::installer::{EntryOutcome, InstallReport, InstallerConfig, ModpackInstaller};
use packfetch::{CatalogConfig, CurseForgeClient};
use tracing::{info, warn};

use super::common::format_size;
use crate::error::CliError;
use crate::progress::ProgressReporter;

/// Arguments for the install command.
pub struct InstallArgs {
    pub archive: PathBuf,
    pub out_dir: PathBuf,
    pub concurrency: Option<usize>,
    pub max_retries: Option<u32>,
    pub no_verify: bool,
    pub api_key: Option<String>,
    pub quiet: bool,
}

/// Apply command-line overrides on top of file settings.
pub fn installer_config(args: &InstallArgs, config: &ConfigFile) -> InstallerConfig {
    let mut installer = config.installer_config();
    if let Some(concurrency) = args.concurrency {
        installer = installer.with_concurrency(concurrency);
    }
    if let Some(retries) = args.max_retries {
        installer = installer.with_max_retries(retries);
    }
    if args.no_verify {
        installer = installer.with_verify_existing(false);
    }
    installer
}

/// Catalog client settings. `--concurrency` bounds lookups as well as
/// downloads.
pub fn catalog_config(args: &InstallArgs, config: &ConfigFile) -> CatalogConfig {
    let catalog = config.catalog_config(args.api_key.as_deref());
    match args.concurrency {
        Some(concurrency) => catalog.with_concurrency(concurrency),
        None => catalog,
    }
}

/// Run the install command.
///
/// Entries that could not be resolved or downloaded are reported but do not
/// fail the command.
pub async fn run(args: InstallArgs, config: &ConfigFile) -> Result<(), CliError> {
    if args.api_key.is_none() {
        warn!("No API key configured; catalog lookups will likely be rejected");
    }

    let catalog = CurseForgeClient::new(catalog_config(&args, config))?;
    let installer_config = installer_config(&args, config);
    info!(
        archive = %args.archive.display(),
        out_dir = %args.out_dir.display(),
        concurrency = installer_config.concurrency,
        max_retries = installer_config.max_retries,
        verify_existing = installer_config.verify_existing,
        "Starting install"
    );

    let installer = ModpackInstaller::new(Arc::new(catalog), installer_config)?
        .with_observer(Arc::new(ProgressReporter::new(args.quiet)));

    let start = Instant::now();
    let report = installer.install(&args.archive, &args.out_dir).await?;
    print_summary(&report, start.elapsed().as_secs_f64());
    Ok(())
}

fn print_summary(report: &InstallReport, seconds: f64) {
    println!();
    println!(
        "{} {} {}",
        style("Installed").green().bold(),
        report.manifest.name,
        report.manifest.version
    );
    println!("  Overrides extracted: {}", report.overrides_extracted);
    println!(
        "  Downloaded:          {} ({})",
        report.downloaded(),
        format_size(report.bytes_downloaded())
    );
    println!("  Already present:     {}", report.already_present());
    println!("  Manifest:            {}", report.manifest_path.display());
    println!("  Elapsed:             {:.1}s", seconds);

    if report.is_complete() {
        return;
    }

    println!();
    println!(
        "{} {} unresolved, {} failed",
        style("Incomplete:").yellow().bold(),
        report.unresolved(),
        report.failed()
    );
    for entry in &report.entries {
        let detail = match &entry.outcome {
            EntryOutcome::Unresolved { reason } => format!("unresolved: {}", reason),
            EntryOutcome::Failed { attempts, reason } => {
                format!("failed after {} attempts: {}", attempts, reason)
            }
            _ => continue,
        };
        println!(
            "  {}/{} {} - {}",
            entry.project_id,
            entry.file_id,
            entry.file_name.as_deref().unwrap_or("?"),
            style(detail).red()
        );
    }
}
