use anyhow::Context;
use clap::{Parser, Subcommand};
use shared::models::Gender;

use timescale_server::db::DbService;
use timescale_server::services::superuser::{SuperuserArgs, create_superuser};
use timescale_server::{Config, Server, init_logger_with_file};

/// TimeScale staff and attendance server
#[derive(Parser)]
#[command(name = "timescale-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the administrator account
    Superuser {
        #[arg(long, env = "SUPERUSER_NAME")]
        name: Option<String>,
        #[arg(long, env = "SUPERUSER_EMAIL")]
        email: Option<String>,
        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// male | female | other
        #[arg(long)]
        gender: Option<Gender>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env().context("invalid configuration")?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(environment = %config.environment, "TimeScale server starting");
            Server::new(config).run().await?;
        }
        Command::Superuser {
            name,
            email,
            password,
            gender,
        } => {
            let args = SuperuserArgs {
                name,
                email,
                password,
                gender,
            };
            let Some(data) = args.into_create()? else {
                tracing::info!("No superuser arguments given, nothing to do");
                return Ok(());
            };
            let db = DbService::new(&config.database_url).await?;
            let admin = create_superuser(&db.pool, data).await?;
            println!("Superuser {} <{}> created", admin.name, admin.email);
        }
    }

    Ok(())
}
