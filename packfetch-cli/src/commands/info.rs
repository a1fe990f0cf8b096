//! Info command - show an archive's manifest without installing.

use std::path::Path;

use console::style;
use packfetch::config::ConfigFile;
use packfetch::installer::inspect;
use packfetch::Manifest;

use crate::error::CliError;

/// Run the info command.
pub async fn run(archive: &Path, show_mods: bool, config: &ConfigFile) -> Result<(), CliError> {
    let manifest_name = config.installer_config().manifest_file_name;
    let manifest = inspect(archive, &manifest_name).await?;
    print_manifest(&manifest, show_mods);
    Ok(())
}

fn print_manifest(manifest: &Manifest, show_mods: bool) {
    println!("{}", style(&manifest.name).bold());
    println!("  Version:    {}", manifest.version);
    println!("  Author:     {}", manifest.author);
    println!("  Minecraft:  {}", manifest.minecraft_version());

    let loaders: Vec<String> = manifest
        .loaders()
        .iter()
        .map(|l| {
            if l.primary {
                format!("{} (primary)", l.id)
            } else {
                l.id.clone()
            }
        })
        .collect();
    if !loaders.is_empty() {
        println!("  Loaders:    {}", loaders.join(", "));
    }

    let required = manifest.entries.iter().filter(|e| e.required).count();
    println!(
        "  Files:      {} ({} required, {} optional)",
        manifest.entries.len(),
        required,
        manifest.entries.len() - required
    );
    println!("  Overrides:  {}/", manifest.overrides);

    if show_mods && !manifest.entries.is_empty() {
        println!();
        println!("  {:>10}  {:>10}  File", "Project", "File ID");
        for entry in &manifest.entries {
            let name = entry.file_name().unwrap_or("-");
            let marker = if entry.required { "" } else { " (optional)" };
            println!(
                "  {:>10}  {:>10}  {}{}",
                entry.project_id, entry.file_id, name, marker
            );
        }
    }
}
