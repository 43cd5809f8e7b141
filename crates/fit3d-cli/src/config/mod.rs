mod credentials;

pub use credentials::CredentialStore;

use crate::error::{Fit3dError, Result};
use std::path::PathBuf;

/// Default configuration directory name
const CONFIG_DIR_NAME: &str = "fit3d";

/// Get the data directory path for storing tokens and the health store
/// Returns ~/.local/share/fit3d on Unix, ~/Library/Application Support/fit3d on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(CONFIG_DIR_NAME))
        .ok_or_else(|| Fit3dError::config("Could not determine data directory"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
