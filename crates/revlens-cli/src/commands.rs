//! Subcommand handlers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use revlens_analyzer::{AnalyzeError, Analyzer, SYSTEM_CONTRACT, SYSTEM_CONTRACT_VERSION};
use revlens_scraper::{extract_reviews, PageClient, ReviewSelector};

/// Runs the full pipeline for `url` and prints the analysis JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the run
/// fails; the message names the failure kind.
pub(crate) async fn run_analyze(url: &str, pretty: bool) -> anyhow::Result<()> {
    let config = revlens_core::load_app_config()?;
    let analyzer = Analyzer::from_config(&config)?;
    analyzer.ensure_credential().map_err(describe)?;

    let cancel = cancel_on_ctrl_c();
    let analysis = analyzer
        .analyze_within(
            url,
            Duration::from_secs(config.analyze_timeout_secs),
            &cancel,
        )
        .await
        .map_err(describe)?;

    let json = if pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    println!("{json}");
    Ok(())
}

/// Fetches `url` and prints every extracted review text, one per line.
///
/// No model call is made, so no API key is needed.
///
/// # Errors
///
/// Returns an error if the selector is invalid, the fetch fails, or no
/// reviews are found.
pub(crate) async fn run_extract(
    url: &str,
    selector: &str,
    timeout_secs: u64,
    max_redirects: usize,
    user_agent: &str,
) -> anyhow::Result<()> {
    let selector = ReviewSelector::parse(selector)?;
    let pages = PageClient::new(timeout_secs, user_agent, max_redirects)?;

    let cancel = cancel_on_ctrl_c();
    let page = pages.fetch(url, &cancel).await?;
    let reviews = extract_reviews(&page.html, &selector)?;

    tracing::info!(url, count = reviews.len(), "extracted reviews");
    for review in &reviews {
        // Keep one review per line even when the markup had line breaks.
        println!("{}", flatten_whitespace(review));
    }
    Ok(())
}

pub(crate) fn run_contract() {
    println!("# system contract version {SYSTEM_CONTRACT_VERSION}");
    println!("{SYSTEM_CONTRACT}");
}

fn describe(err: AnalyzeError) -> anyhow::Error {
    anyhow::anyhow!("{err} [{}]", err.kind())
}

fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns a token that is cancelled when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_signal.cancel();
        }
    });
    cancel
}
