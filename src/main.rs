//! CLI entry point for portable-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portable_blog::Blog;

#[derive(Parser)]
#[command(name = "portable-blog")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "A server-rendered blog front end for a headless content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read content from a dataset export (JSON array or NDJSON) instead of the remote store
    #[arg(long, global = true)]
    dataset_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Export every page as static HTML
    #[command(alias = "g")]
    Generate,

    /// Remove exported pages
    Clean,

    /// List published posts
    List,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "portable_blog=debug,info"
    } else {
        "portable_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let dataset_file = cli.dataset_file;
    let load = || -> Result<Blog> {
        Ok(Blog::new(&base_dir)?.with_dataset_file(dataset_file.clone()))
    };

    match cli.command {
        Commands::Server { port, ip, open } => {
            let blog = load()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            portable_blog::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Generate => {
            let blog = load()?;
            tracing::info!("Generating static files...");
            let count = blog.generate().await?;
            println!("Generated {} pages into {:?}", count, blog.public_dir);
        }

        Commands::Clean => {
            let blog = Blog::open(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let blog = load()?;
            portable_blog::commands::list::run(&blog).await?;
        }

        Commands::Version => {
            println!("portable-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
