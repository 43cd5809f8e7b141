use crate::client::SessionToken;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

const TOKEN_FILENAME: &str = "session_token.json";

/// Manages storage for the captured dashboard session token.
pub struct CredentialStore {
    base_dir: PathBuf,
}

impl CredentialStore {
    /// Create a credential store under the default data directory
    pub fn new() -> Result<Self> {
        let base_dir = super::data_dir()?;
        super::ensure_dir(&base_dir)?;

        Ok(Self { base_dir })
    }

    /// Create a credential store with a custom base directory (for testing)
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        super::ensure_dir(&base_dir)?;

        Ok(Self { base_dir })
    }

    fn token_path(&self) -> PathBuf {
        self.base_dir.join(TOKEN_FILENAME)
    }

    /// Save the session token to storage
    pub fn save_token(&self, token: &SessionToken) -> Result<()> {
        let path = self.token_path();
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&path, json)?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Load the session token from storage
    pub fn load_token(&self) -> Result<Option<SessionToken>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let token: SessionToken = serde_json::from_str(&json)?;
        Ok(Some(token))
    }

    /// Check if a token is stored
    pub fn has_token(&self) -> bool {
        self.token_path().exists()
    }

    /// Delete the stored token
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
