mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use revlens_core::{DEFAULT_FETCH_USER_AGENT, DEFAULT_REVIEW_SELECTOR};

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Analyze product reviews with Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a product page, analyze its reviews, and print the analysis JSON
    Analyze {
        /// Product page URL
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Fetch a product page and print the review texts found on it, one per line
    Extract {
        /// Product page URL
        url: String,

        /// CSS selector matching review text nodes
        #[arg(long, env = "REVLENS_REVIEW_SELECTOR", default_value = DEFAULT_REVIEW_SELECTOR)]
        selector: String,

        /// Page fetch timeout in seconds
        #[arg(long, env = "REVLENS_FETCH_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,

        /// Maximum number of redirects followed for the page request
        #[arg(long, env = "REVLENS_FETCH_MAX_REDIRECTS", default_value_t = 5)]
        max_redirects: usize,

        /// User-Agent header sent with the page request
        #[arg(long, env = "REVLENS_FETCH_USER_AGENT", default_value = DEFAULT_FETCH_USER_AGENT)]
        user_agent: String,
    },
    /// Print the system contract sent to the model with every request
    Contract,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so stdout stays pipeable JSON.
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { url, pretty } => commands::run_analyze(&url, pretty).await,
        Commands::Extract {
            url,
            selector,
            timeout_secs,
            max_redirects,
            user_agent,
        } => {
            commands::run_extract(&url, &selector, timeout_secs, max_redirects, &user_agent).await
        }
        Commands::Contract => {
            commands::run_contract();
            Ok(())
        }
    }
}
