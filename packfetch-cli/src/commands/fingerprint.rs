//! Fingerprint command - print the catalog fingerprint of local files.

use std::path::PathBuf;

use packfetch::fingerprint::fingerprint_file;

use crate::error::CliError;

/// Run the fingerprint command.
///
/// Prints `<fingerprint>\t<path>` per file, in argument order.
pub fn run(files: &[PathBuf]) -> Result<(), CliError> {
    for path in files {
        let value = fingerprint_file(path).map_err(|error| CliError::FileRead {
            path: path.display().to_string(),
            error,
        })?;
        println!("{}\t{}", value, path.display());
    }
    Ok(())
}
