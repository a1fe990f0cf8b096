//! packfetch CLI - Command-line interface
//!
//! This binary provides a command-line interface to the packfetch library.

mod commands;
mod error;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use packfetch::logging::{default_log_dir, default_log_file, init_logging};

use commands::download::DownloadArgs;
use commands::install::InstallArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "packfetch")]
#[command(version, about = "Install modpacks from CurseForge archives", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// CurseForge API key
    #[arg(long, global = true, env = "CURSEFORGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to a config file (default: ~/.packfetch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a modpack archive into a directory
    Install {
        /// Modpack zip archive
        archive: PathBuf,

        /// Directory to install into
        out_dir: PathBuf,

        /// Maximum number of concurrent lookups and downloads
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Download attempts per file
        #[arg(long)]
        max_retries: Option<u32>,

        /// Trust files already on disk without checking fingerprints
        #[arg(long)]
        no_verify: bool,

        /// Hide progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show an archive's manifest without installing
    Info {
        /// Modpack zip archive
        archive: PathBuf,

        /// List every file entry
        #[arg(long)]
        show_mods: bool,
    },

    /// Show the newest archive of a pack project
    Latest {
        /// Catalog project id of the modpack
        project_id: u32,

        /// Prefer files for this game version
        #[arg(short, long)]
        game_version: Option<String>,
    },

    /// Download the newest archive of a pack project
    Download {
        /// Catalog project id of the modpack
        project_id: u32,

        /// Directory to save the archive in
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Prefer files for this game version
        #[arg(short, long)]
        game_version: Option<String>,

        /// Hide progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print catalog fingerprints of local files
    Fingerprint {
        /// Files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Fingerprinting is offline and writes only to stdout.
    if let Commands::Fingerprint { files } = &cli.command {
        return commands::fingerprint::run(files);
    }

    let _logging_guard = init_logging(&default_log_dir(), default_log_file(), cli.verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;
    let config = commands::common::load_config(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    match cli.command {
        Commands::Install {
            archive,
            out_dir,
            concurrency,
            max_retries,
            no_verify,
            quiet,
        } => {
            let args = InstallArgs {
                archive,
                out_dir,
                concurrency,
                max_retries,
                no_verify,
                api_key: cli.api_key,
                quiet,
            };
            runtime.block_on(commands::install::run(args, &config))
        }
        Commands::Info { archive, show_mods } => {
            runtime.block_on(commands::info::run(&archive, show_mods, &config))
        }
        Commands::Latest {
            project_id,
            game_version,
        } => runtime.block_on(commands::latest::run(
            project_id,
            game_version.as_deref(),
            cli.api_key.as_deref(),
            &config,
        )),
        Commands::Download {
            project_id,
            output_dir,
            game_version,
            quiet,
        } => {
            let args = DownloadArgs {
                project_id,
                output_dir,
                game_version,
                api_key: cli.api_key,
                quiet,
            };
            runtime.block_on(commands::download::run(args, &config))
        }
        Commands::Fingerprint { .. } => Ok(()),
    }
}
