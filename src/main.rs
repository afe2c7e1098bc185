//! CLI entry point for unicorn-content

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "unicorn-content")]
#[command(version = "0.1.0")]
#[command(about = "Load and inspect the content of a statically generated blog", long_about = None)]
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
    /// List site information
    List {
        /// Type of content to list (posts, collections, authors, tags)
        #[arg(default_value = "posts")]
        r#type: String,

        /// Locale to list (defaults to the site's default locale)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Show the post or collection read from a source file
    Show {
        /// Path of the index file, e.g. content/blog/my-post/index.fr.md
        path: PathBuf,
    },

    /// Render one page of the post card grid
    Grid {
        /// Locale to render (defaults to the site's default locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Use expanded cards for posts with a banner
        #[arg(short, long)]
        expanded: bool,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Export all loaded content as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "unicorn_content=debug,info"
    } else {
        "unicorn_content=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::List { r#type, locale } => {
            let site = unicorn_content::Site::new(&base_dir)?;
            unicorn_content::commands::list::run(&site, &r#type, locale.as_deref()).await?;
        }

        Commands::Show { path } => {
            let site = unicorn_content::Site::new(&base_dir)?;
            unicorn_content::commands::show::run(&site, &path).await?;
        }

        Commands::Grid {
            locale,
            expanded,
            page,
        } => {
            let site = unicorn_content::Site::new(&base_dir)?;
            unicorn_content::commands::grid::run(&site, locale.as_deref(), expanded, page).await?;
        }

        Commands::Export { output } => {
            let site = unicorn_content::Site::new(&base_dir)?;
            tracing::info!("Exporting content from {:?}", base_dir);
            unicorn_content::commands::export::run(&site, output.as_deref()).await?;
        }

        Commands::Version => {
            println!("unicorn-content version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
