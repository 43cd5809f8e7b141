//! Authentication commands for fit3d-cli

use crate::client::AuthSession;
use crate::config::CredentialStore;
use crate::error::{Fit3dError, Result};
use std::io::{self, Write};

/// Execute the login command
pub async fn login(email: Option<String>) -> Result<()> {
    let store = CredentialStore::new()?;

    if store.has_token() {
        println!("Already logged in. Use 'fit3d auth logout' to log out first.");
        return Ok(());
    }

    // Get email
    let email = match email {
        Some(e) => e,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };

    // Get password
    let password = prompt_password("Password: ")?;

    println!("Attempting login...");

    let session = AuthSession::new()?;
    match session.login(&email, &password).await {
        Ok(token) => {
            store.save_token(&token)?;
            println!("\t✓ Token found");
            println!("Ready for Import");
        }
        Err(error) => {
            println!("\t✗ {}", failure_text(&error));
        }
    }

    Ok(())
}

/// Execute the logout command
pub async fn logout() -> Result<()> {
    let store = CredentialStore::new()?;

    if !store.has_token() {
        println!("Not logged in.");
        return Ok(());
    }

    store.clear()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Execute the status command
pub async fn status() -> Result<()> {
    let store = CredentialStore::new()?;

    match store.load_token()? {
        Some(token) => {
            println!("Status: Logged in");

            let age = token.age_seconds();
            if age > 3600 {
                println!("Token captured {} hours ago", age / 3600);
            } else if age > 60 {
                println!("Token captured {} minutes ago", age / 60);
            } else {
                println!("Token captured {} seconds ago", age);
            }
            println!("The records endpoint will answer 401 once it has expired.");
        }
        None => {
            println!("Status: Not logged in");
            println!("Run 'fit3d auth login' to authenticate.");
        }
    }

    Ok(())
}

/// The bare reason shown after a "✗" marker
fn failure_text(error: &Fit3dError) -> String {
    match error {
        Fit3dError::Authentication(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Prompt for password without echoing
fn prompt_password(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let password = rpassword::read_password()
        .map_err(|e| Fit3dError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;

    Ok(password)
}
