//! Review analysis orchestration.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use revlens_core::{Analysis, AppConfig};
use revlens_scraper::{extract_reviews, PageClient, ReviewSelector};

use crate::batch::ReviewBatch;
use crate::contract::SYSTEM_CONTRACT_VERSION;
use crate::error::{AnalyzeError, SetupError, URL_REQUIRED};
use crate::gemini::GeminiClient;
use crate::validate::parse_analysis;

/// Where a pipeline run is. Runs move strictly forward through these; any
/// failure ends the run in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Fetching,
    Extracting,
    Sampling,
    Requesting,
    Validating,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Idle => "starting",
            Stage::Fetching => "fetching the page",
            Stage::Extracting => "extracting reviews",
            Stage::Sampling => "sampling reviews",
            Stage::Requesting => "requesting analysis",
            Stage::Validating => "validating the analysis",
            Stage::Done => "finishing",
        };
        f.write_str(s)
    }
}

/// Bookkeeping for one run: current stage and start time, for logs.
struct PipelineRun<'a> {
    url: &'a str,
    stage: Stage,
    started: Instant,
}

impl<'a> PipelineRun<'a> {
    fn start(url: &'a str) -> Self {
        Self {
            url,
            stage: Stage::Idle,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: Stage) {
        tracing::debug!(url = self.url, from = ?self.stage, to = ?next, "pipeline stage");
        self.stage = next;
    }

    /// Fails with [`AnalyzeError::Cancelled`] at the current stage once
    /// `cancel` has fired.
    fn checkpoint(&self, cancel: &CancellationToken) -> Result<(), AnalyzeError> {
        if cancel.is_cancelled() {
            return Err(AnalyzeError::Cancelled { stage: self.stage });
        }
        Ok(())
    }

    fn finish<T>(&mut self, result: &Result<T, AnalyzeError>) {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(_) => {
                self.stage = Stage::Done;
                tracing::info!(url = self.url, elapsed_ms, "analysis run done");
            }
            Err(e) => {
                tracing::warn!(
                    url = self.url,
                    stage = ?self.stage,
                    kind = %e.kind(),
                    error = %e,
                    elapsed_ms,
                    "analysis run failed"
                );
            }
        }
    }
}

/// Runs the fetch → extract → sample → request → validate chain.
///
/// Holds only immutable, process-wide state; one `Analyzer` is shared by all
/// concurrent requests (wrap it in an `Arc`). Each call to
/// [`Analyzer::analyze`] is an independent run.
#[derive(Debug)]
pub struct Analyzer {
    pages: PageClient,
    model: GeminiClient,
    selector: ReviewSelector,
    max_batch_size: usize,
}

impl Analyzer {
    /// A `max_batch_size` of zero is raised to one.
    #[must_use]
    pub fn new(
        pages: PageClient,
        model: GeminiClient,
        selector: ReviewSelector,
        max_batch_size: usize,
    ) -> Self {
        Self {
            pages,
            model,
            selector,
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Builds the page client, model client, and selector from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the selector does not parse or either HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let selector = ReviewSelector::parse(&config.review_selector)?;
        let pages = PageClient::from_config(config)?;
        let model = GeminiClient::from_config(config)?;
        Ok(Self::new(pages, model, selector, config.max_batch_size))
    }

    /// Fails when the model credential is blank or the sample placeholder.
    ///
    /// Binaries call this at startup so a misconfigured process never
    /// starts serving.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::UpstreamAuth`].
    pub fn ensure_credential(&self) -> Result<(), AnalyzeError> {
        if self.model.has_usable_credential() {
            Ok(())
        } else {
            Err(AnalyzeError::UpstreamAuth)
        }
    }

    #[must_use]
    pub fn selector(&self) -> &ReviewSelector {
        &self.selector
    }

    #[must_use]
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    #[must_use]
    pub fn contract_version(&self) -> &'static str {
        SYSTEM_CONTRACT_VERSION
    }

    /// Analyzes the reviews on the page at `url`.
    ///
    /// Stages run strictly in order and the first failure ends the run; no
    /// partial analysis is ever returned. The model is called at most once
    /// and never retried.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalyzeError`]; see [`AnalyzeError::kind`] for the
    /// classification.
    pub async fn analyze(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalyzeError> {
        let url = url.trim();
        let mut run = PipelineRun::start(url);
        let result = self.run_analysis(&mut run, url, cancel).await;
        run.finish(&result);
        result
    }

    /// Like [`Analyzer::analyze`], but gives up after `deadline`.
    ///
    /// Cancellation of `cancel` still reports [`AnalyzeError::Cancelled`];
    /// running out of time reports [`AnalyzeError::Timeout`] naming the stage
    /// that was in progress.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze`].
    pub async fn analyze_within(
        &self,
        url: &str,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalyzeError> {
        let run_token = cancel.child_token();
        let timer_token = run_token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            timer_token.cancel();
        });

        let result = self.analyze(url, &run_token).await;
        timer.abort();

        match result {
            Err(AnalyzeError::Cancelled { stage }) if !cancel.is_cancelled() => {
                tracing::warn!(
                    url,
                    deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                    %stage,
                    "analysis deadline exceeded"
                );
                Err(AnalyzeError::Timeout { stage })
            }
            other => other,
        }
    }

    async fn run_analysis(
        &self,
        run: &mut PipelineRun<'_>,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalyzeError> {
        let reviews = self.fetch_reviews(run, url, cancel).await?;

        run.advance(Stage::Sampling);
        let extracted = reviews.len();
        let batch = ReviewBatch::new(reviews, self.max_batch_size).ok_or_else(|| {
            AnalyzeError::NoReviewsFound {
                selector: self.selector.as_str().to_owned(),
            }
        })?;
        tracing::info!(url, extracted, sampled = batch.len(), "sampled reviews for analysis");

        run.checkpoint(cancel)?;

        run.advance(Stage::Requesting);
        let raw = self
            .model
            .generate(&batch, cancel)
            .await
            .map_err(AnalyzeError::from_model)?;

        run.advance(Stage::Validating);
        parse_analysis(&raw)
    }

    async fn fetch_reviews(
        &self,
        run: &mut PipelineRun<'_>,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, AnalyzeError> {
        if url.is_empty() {
            return Err(AnalyzeError::validation(URL_REQUIRED));
        }

        run.advance(Stage::Fetching);
        let page = self
            .pages
            .fetch(url, cancel)
            .await
            .map_err(|e| AnalyzeError::from_scraper(e, Stage::Fetching))?;

        run.advance(Stage::Extracting);
        extract_reviews(&page.html, &self.selector)
            .map_err(|e| AnalyzeError::from_scraper(e, Stage::Extracting))
    }
}
