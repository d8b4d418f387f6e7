use std::sync::Arc;
use talkback_common::Comment;
use talkback_llm::{ChatMessage, CompletionClient, CompletionOutcome, LlmError};

/// Closing instruction appended after the sampled comments.
pub const SUMMARY_INSTRUCTION: &str =
    "Summarize the main points and opinions of users in English returning the response in html format.";

/// Messages per completion request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    /// The completion service throttled one of the batches.
    RateLimited,
}

#[derive(thiserror::Error, Debug)]
pub enum SummarizeError {
    #[error("batch {batch} rejected with status {status}: {message}")]
    Failed {
        batch: usize,
        status: u16,
        message: String,
    },

    #[error("batch {batch} could not reach the completion service: {source}")]
    Transport {
        batch: usize,
        #[source]
        source: LlmError,
    },

    #[error("batch {batch} returned no completion text")]
    Empty { batch: usize },
}

/// One `user` message per comment, then the instruction as `assistant`.
pub fn build_messages(sample: &[Comment]) -> Vec<ChatMessage> {
    sample
        .iter()
        .map(|c| ChatMessage::user(c.as_str()))
        .chain(std::iter::once(ChatMessage::assistant(SUMMARY_INSTRUCTION)))
        .collect()
}

/// Consecutive batches of `size`; only the last may be shorter.
pub fn batches(messages: &[ChatMessage], size: usize) -> std::slice::Chunks<'_, ChatMessage> {
    messages.chunks(size.max(1))
}

/// Sends a sample to the completion service in fixed-size batches.
#[derive(Clone)]
pub struct BatchSummarizer {
    client: Arc<dyn CompletionClient + Send + Sync>,
    batch_size: usize,
}

impl BatchSummarizer {
    pub fn new(client: Arc<dyn CompletionClient + Send + Sync>) -> Self {
        Self {
            client,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Submit every batch in order, awaiting each before sending the next.
    ///
    /// Only the completion of the final batch is returned. A throttled batch
    /// stops the run.
    pub async fn summarize(&self, sample: &[Comment]) -> Result<SummaryOutcome, SummarizeError> {
        let messages = build_messages(sample);
        let total = messages.len().div_ceil(self.batch_size);
        let mut last = String::new();

        for (index, batch) in batches(&messages, self.batch_size).enumerate() {
            tracing::debug!(
                batch = index,
                of = total,
                messages = batch.len(),
                model = self.client.model_name(),
                "summarize.batch.send"
            );

            match self.client.complete(batch).await {
                Ok(CompletionOutcome::Completed(text)) => last = text,
                Ok(CompletionOutcome::RateLimited) => {
                    tracing::warn!(batch = index, of = total, "summarize.rate_limited");
                    return Ok(SummaryOutcome::RateLimited);
                }
                Err(LlmError::Api { status, message }) => {
                    return Err(SummarizeError::Failed {
                        batch: index,
                        status,
                        message,
                    })
                }
                Err(LlmError::EmptyResponse) => return Err(SummarizeError::Empty { batch: index }),
                Err(source) => {
                    return Err(SummarizeError::Transport {
                        batch: index,
                        source,
                    })
                }
            }
        }

        tracing::info!(batches = total, chars = last.len(), "summarize.done");
        Ok(SummaryOutcome::Summary(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkback_llm::ChatRole;

    fn comments(n: usize) -> Vec<Comment> {
        (0..n).map(|i| Comment::from_raw(&format!("k{i}"))).collect()
    }

    #[test]
    fn instruction_closes_the_message_list() {
        let msgs = build_messages(&comments(3));
        assert_eq!(msgs.len(), 4);
        assert!(msgs[..3].iter().all(|m| m.role == ChatRole::User));
        assert_eq!(msgs[0].content, "k0");
        assert_eq!(msgs[3], ChatMessage::assistant(SUMMARY_INSTRUCTION));
    }

    #[test]
    fn empty_sample_still_carries_the_instruction() {
        let msgs = build_messages(&[]);
        assert_eq!(msgs, vec![ChatMessage::assistant(SUMMARY_INSTRUCTION)]);
        assert_eq!(batches(&msgs, DEFAULT_BATCH_SIZE).count(), 1);
    }

    #[test]
    fn batches_are_full_except_the_last() {
        let msgs = build_messages(&comments(50));
        let sizes: Vec<usize> = batches(&msgs, 20).map(<[ChatMessage]>::len).collect();
        assert_eq!(sizes, vec![20, 20, 11]);

        let msgs = build_messages(&comments(19));
        let sizes: Vec<usize> = batches(&msgs, 20).map(<[ChatMessage]>::len).collect();
        assert_eq!(sizes, vec![20]);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let msgs = build_messages(&comments(2));
        assert_eq!(batches(&msgs, 0).count(), 3);
    }
}
