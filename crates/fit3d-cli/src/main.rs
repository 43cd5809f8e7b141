use clap::{Parser, Subcommand};
use fit3d_cli::cli::commands;

#[derive(Parser)]
#[command(name = "fit3d")]
#[command(author, version, about = "CLI for importing Fit3D body scans into a local health store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Scan record commands
    Scans {
        #[command(subcommand)]
        command: ScanCommands,
    },
    /// Import scans into the health store
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Login to the Fit3D dashboard and capture a session token
    Login {
        /// Email address
        #[arg(short, long, env = "FIT3D_EMAIL")]
        email: Option<String>,
    },
    /// Logout and clear the captured token
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand)]
enum ScanCommands {
    /// List available scan records
    List,
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Run the import
    Run {
        /// Health store database path
        #[arg(long)]
        db: Option<String>,
        /// Import into a throwaway in-memory store (nothing persisted)
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> fit3d_cli::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { email } => commands::login(email).await,
            AuthCommands::Logout => commands::logout().await,
            AuthCommands::Status => commands::status().await,
        },
        Commands::Scans { command } => match command {
            ScanCommands::List => commands::list_scans().await,
        },
        Commands::Import { command } => match command {
            ImportCommands::Run { db, dry_run } => commands::import_run(db, dry_run).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
