//! Import command for fit3d-cli

use std::path::PathBuf;

use crate::client::Fit3dClient;
use crate::config::{self, CredentialStore};
use crate::error::{Fit3dError, Result};
use crate::import::{ConsoleSink, ImportPipeline, PipelineOutcome};
use crate::store::{HealthStore, MemoryHealthStore, SqliteHealthStore};

/// Run the full import: fetch the scans, then import every metric of every
/// scan into the health store.
pub async fn run(db: Option<String>, dry_run: bool) -> Result<()> {
    let credentials = CredentialStore::new()?;
    let token = credentials.load_token()?.ok_or(Fit3dError::NotAuthenticated)?;

    println!("Downloading scans...");

    let client = Fit3dClient::new();
    let (records, message) = match client.fetch_records(&token).await {
        Ok(fetched) => fetched,
        Err(error) => {
            println!("\t✗ {}", error);
            return Ok(());
        }
    };

    println!("\t✓ {}", message);

    let store: Box<dyn HealthStore> = if dry_run {
        println!("Dry run mode - samples will not be persisted");
        Box::new(MemoryHealthStore::new())
    } else {
        Box::new(SqliteHealthStore::open(health_db_path(db)?)?)
    };

    let mut sink = ConsoleSink;
    let outcome = ImportPipeline::new(store.as_ref()).run(&records, &mut sink).await;

    if outcome == PipelineOutcome::Completed {
        println!("Import finished");
    }

    Ok(())
}

/// Resolve the health store path, defaulting to the user data directory
fn health_db_path(db: Option<String>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(PathBuf::from(path)),
        None => {
            let dir = config::data_dir()?;
            config::ensure_dir(&dir)?;
            Ok(dir.join("health.db"))
        }
    }
}
