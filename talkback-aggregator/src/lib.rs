//! Comment aggregation pipeline.
//!
//! [`Aggregator::interpret`] runs one article URL through
//! extract → count → [`sample`] → [`BatchSummarizer::summarize`] → [`Report::assemble`].
//! All collaborators are injected, so tests can swap the comment source, the
//! completion client and the random source independently.
pub mod sample;
pub mod summarize;

pub use sample::{sample, DEFAULT_SAMPLE_CAP};
pub use summarize::{
    batches, build_messages, BatchSummarizer, SummarizeError, SummaryOutcome, DEFAULT_BATCH_SIZE,
    SUMMARY_INSTRUCTION,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use talkback_comments::{source_for, CommentSource, ExtractError, Forwarder};
use talkback_common::Report;
use talkback_config::TalkbackConfig;
use talkback_llm::{client_from_config, CompletionClient};

#[derive(thiserror::Error, Debug)]
pub enum AggregateError {
    #[error("Key and/or endpoint not configured for cognitive services!")]
    NotConfigured,

    #[error("comment extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizeError),

    #[error("pipeline setup failed: {0}")]
    Setup(String),
}

/// The assembled pipeline for one configuration.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn CommentSource>,
    summarizer: BatchSummarizer,
    sample_cap: usize,
}

impl Aggregator {
    /// Wire the pipeline from explicit collaborators.
    ///
    /// Refuses with [`AggregateError::NotConfigured`] when no completion key is
    /// configured.
    pub fn new(
        config: &TalkbackConfig,
        source: Arc<dyn CommentSource>,
        client: Arc<dyn CompletionClient + Send + Sync>,
    ) -> Result<Self, AggregateError> {
        if !config.is_configured() {
            return Err(AggregateError::NotConfigured);
        }
        Ok(Self {
            source,
            summarizer: BatchSummarizer::new(client).with_batch_size(config.batching.size),
            sample_cap: config.sampling.cap,
        })
    }

    /// Build the forwarder, comment source and OpenAI client described by `config`.
    pub fn from_config(config: &TalkbackConfig) -> Result<Self, AggregateError> {
        if !config.is_configured() {
            return Err(AggregateError::NotConfigured);
        }
        let forwarder = Forwarder::new(&config.forwarder.base_url)
            .map_err(|e| AggregateError::Setup(format!("forwarder: {e}")))?;
        let source = source_for(config.extraction.variant, forwarder);
        let client =
            client_from_config(&config.openai).map_err(|e| AggregateError::Setup(e.to_string()))?;

        tracing::debug!(
            variant = source.name(),
            model = client.model_name(),
            relay = %config.forwarder.base_url,
            "aggregator.configured"
        );
        Self::new(config, Arc::new(source), client)
    }

    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    /// Produce the report for one article URL.
    pub async fn interpret(&self, url: &str) -> Result<Report, AggregateError> {
        let mut rng = StdRng::from_entropy();
        self.interpret_with_rng(url, &mut rng).await
    }

    /// Same as [`Aggregator::interpret`] with a caller-supplied random source.
    pub async fn interpret_with_rng<R: Rng + Send>(
        &self,
        url: &str,
        rng: &mut R,
    ) -> Result<Report, AggregateError> {
        let comments = self.source.extract(url).await.map_err(|e| {
            tracing::error!(url, source = self.source.name(), error = %e, "aggregator.extract_failed");
            AggregateError::Extraction(e)
        })?;
        let original_count = comments.len();

        let picked = sample(&comments, self.sample_cap, rng);
        tracing::info!(
            url,
            comments = original_count,
            sampled = picked.len(),
            "aggregator.sampled"
        );

        let outcome = self.summarizer.summarize(&picked).await.map_err(|e| {
            tracing::error!(url, error = %e, "aggregator.summarize_failed");
            AggregateError::Summarization(e)
        })?;

        Ok(match outcome {
            SummaryOutcome::Summary(text) => Report::assemble(original_count, text),
            SummaryOutcome::RateLimited => Report::rate_limited(),
        })
    }
}
