//! CLI entry point for contentpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contentpress::generator::BuildStage;
use contentpress::Site;

#[derive(Parser)]
#[command(name = "contentpress")]
#[command(version)]
#[command(about = "A static blog generator fed by a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Build in the develop stage (drafts shown, inline source maps)
        #[arg(long)]
        develop: bool,

        /// Read the content query result from a JSON file instead of the API
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Print the page plan without rendering
    Plan {
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Print as JSON, including page contexts
        #[arg(long)]
        json: bool,
    },

    /// Build in the develop stage and serve the output
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, author, route)
        #[arg(default_value = "post")]
        r#type: String,

        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "contentpress=debug,info"
    } else {
        "contentpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate { develop, snapshot } => {
            let site = Site::new(&base_dir)?;
            let stage = if develop {
                BuildStage::Develop
            } else {
                BuildStage::BuildHtml
            };
            contentpress::commands::generate::run(&site, stage, snapshot.as_deref()).await?;
            println!("Generated successfully!");
        }

        Commands::Plan { snapshot, json } => {
            let site = Site::new(&base_dir)?;
            contentpress::commands::plan::run(&site, snapshot.as_deref(), json).await?;
        }

        Commands::Server { port, ip, snapshot } => {
            let site = Site::new(&base_dir)?;
            contentpress::commands::generate::run(&site, BuildStage::Develop, snapshot.as_deref())
                .await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            contentpress::server::start(&site, &ip, port).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            contentpress::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type, snapshot } => {
            let site = Site::new(&base_dir)?;
            contentpress::commands::list::run(&site, &r#type, snapshot.as_deref()).await?;
        }

        Commands::Version => {
            println!("contentpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
