//! Download command - fetch a pack project's newest archive.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use packfetch::config::ConfigFile;
use packfetch::installer::{ModpackInstaller, PackDownload};
use packfetch::CurseForgeClient;
use tracing::info;

use super::common::format_size;
use crate::error::CliError;
use crate::progress::ProgressReporter;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub project_id: u32,
    pub output_dir: PathBuf,
    pub game_version: Option<String>,
    pub api_key: Option<String>,
    pub quiet: bool,
}

/// Run the download command.
pub async fn run(args: DownloadArgs, config: &ConfigFile) -> Result<(), CliError> {
    let catalog = CurseForgeClient::new(config.catalog_config(args.api_key.as_deref()))?;
    let installer = ModpackInstaller::new(Arc::new(catalog), config.installer_config())?
        .with_observer(Arc::new(ProgressReporter::new(args.quiet)));

    info!(
        project_id = args.project_id,
        output_dir = %args.output_dir.display(),
        game_version = args.game_version.as_deref().unwrap_or(""),
        "Downloading pack"
    );
    let pack = installer
        .download_pack(
            args.project_id,
            args.game_version.as_deref(),
            &args.output_dir,
        )
        .await?;
    print_result(&pack);
    Ok(())
}

fn print_result(pack: &PackDownload) {
    let heading = if pack.was_present() {
        style("Already downloaded").yellow().bold()
    } else {
        style("Downloaded").green().bold()
    };
    println!("{} {}", heading, pack.project.name);
    println!("  File:  {} (id {})", pack.file.file_name, pack.file.id);
    println!("  Saved: {}", pack.path.display());
    println!("  Size:  {}", format_size(pack.file.file_length.max(pack.bytes)));
}
