//! Latest command - show which archive a pack project would download.

use console::style;
use packfetch::catalog::{RemoteFile, RemoteProject};
use packfetch::config::ConfigFile;
use packfetch::installer::select_latest_file;
use packfetch::{CatalogClient, CurseForgeClient};

use super::common::format_size;
use crate::error::CliError;

/// Run the latest command.
pub async fn run(
    project_id: u32,
    game_version: Option<&str>,
    api_key: Option<&str>,
    config: &ConfigFile,
) -> Result<(), CliError> {
    let catalog = CurseForgeClient::new(config.catalog_config(api_key))?;
    let project = catalog.lookup_project(project_id).await?;
    print_project(&project, game_version);
    Ok(())
}

fn print_project(project: &RemoteProject, game_version: Option<&str>) {
    println!("{} ({})", style(&project.name).bold(), project.slug);
    println!("  Project ID: {}", project.id);

    match select_latest_file(project, game_version) {
        Some(file) => {
            println!();
            println!("{}", style("Selected file").green().bold());
            println!("  Name:       {}", display_name(file));
            println!("  File:       {}", file.file_name);
            println!("  File ID:    {}", file.id);
            println!("  Size:       {}", format_size(file.file_length));
            println!("  Released:   {}", release_date(file));
            if !file.game_versions.is_empty() {
                println!("  Versions:   {}", file.game_versions.join(", "));
            }
        }
        None => {
            println!();
            println!("{}", style("No downloadable pack file").yellow().bold());
        }
    }

    if project.latest_files.is_empty() {
        return;
    }
    println!();
    println!("  {:>10}  {:<10}  File", "File ID", "Released");
    for file in &project.latest_files {
        let marker = if file.is_server_pack { " [server]" } else { "" };
        println!(
            "  {:>10}  {:<10}  {}{}",
            file.id,
            release_date(file),
            file.file_name,
            marker
        );
    }
}

fn display_name(file: &RemoteFile) -> &str {
    if file.display_name.is_empty() {
        &file.file_name
    } else {
        &file.display_name
    }
}

fn release_date(file: &RemoteFile) -> String {
    file.release_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
