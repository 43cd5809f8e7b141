//! Scan listing command for fit3d-cli

use crate::client::Fit3dClient;
use crate::config::CredentialStore;
use crate::error::{Fit3dError, Result};
use crate::import::format;

/// List the scans available on the user's account
pub async fn list() -> Result<()> {
    let store = CredentialStore::new()?;
    let token = store.load_token()?.ok_or(Fit3dError::NotAuthenticated)?;

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

    if records.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:<18} {:>8} {:>8} {:>8} {:>6} {:>7} {:>7}",
        "Date", "Height", "Weight", "Lean", "BMI", "Fat %", "Waist"
    );
    println!("{}", "-".repeat(68));

    for record in &records {
        let metrics = &record.wellness_metrics;
        println!(
            "{:<18} {:>8} {:>8} {:>8} {:>6} {:>7} {:>7}",
            format::scan_date(record.record_date, format::REPORT_TIME_ZONE),
            format!("{}in", format::decimal(metrics.height, 2)),
            format!("{}lb", format::decimal(metrics.weight, 2)),
            format!("{}lb", format::decimal(metrics.lean_mass, 2)),
            format::decimal(metrics.bmi, 2),
            format!("{}%", format::decimal(metrics.bfp, 2)),
            format!(
                "{}in",
                format::decimal(record.scan_measurement.waist_natural_girth, 2)
            ),
        );
    }

    println!("\nShowing {} scans", records.len());

    Ok(())
}
