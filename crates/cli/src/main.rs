use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shelf_db::ConnectionProvider;
use shelf_kernel::settings::Settings;

/// Book inventory server and maintenance commands.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the web interface (default)
    Serve,
    /// Open and close one database connection
    CheckDb,
    /// Print the effective settings with secrets redacted
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "shelf serve starting");
            shelf_app::serve(&settings).await
        }
        Command::CheckDb => {
            shelf_telemetry::init(&settings.telemetry)?;
            let provider = ConnectionProvider::new(&settings.database);
            match provider.open().await {
                Some(conn) => {
                    conn.close().await;
                    println!("database reachable: {}", provider.target());
                    Ok(())
                }
                None => bail!("database unreachable: {}", provider.target()),
            }
        }
        Command::ShowConfig => {
            let printed = serde_json::to_string_pretty(&settings.redacted())
                .context("failed to serialize settings")?;
            println!("{printed}");
            Ok(())
        }
    }
}
