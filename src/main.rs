use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use readlater::app::AppContext;
use readlater::cli::{commands, Cli, Commands};
use readlater::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::login(&ctx, &username, &password).await?;
        }
        Commands::Logout => {
            commands::logout(&ctx).await?;
        }
        Commands::Status => {
            commands::status(&ctx).await?;
        }
        Commands::Save {
            url,
            title,
            selection,
        } => {
            commands::save(&ctx, &url, &title, &selection).await?;
        }
        Commands::Articles { feed } => {
            commands::list_articles(&ctx, feed.as_deref()).await?;
        }
        Commands::Pick {
            index,
            feed,
            selection,
        } => {
            commands::pick(&ctx, index, feed.as_deref(), &selection).await?;
        }
        Commands::Pending => {
            commands::list_pending(&ctx).await?;
        }
        Commands::Retry => {
            commands::retry(&ctx).await?;
        }
        Commands::Clear => {
            commands::clear(&ctx).await?;
        }
    }

    Ok(())
}
