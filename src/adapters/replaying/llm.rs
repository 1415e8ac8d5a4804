//! Replaying adapter for the `LlmClient` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::format::decode_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

/// Serves recorded completions; the request is not compared.
pub struct ReplayingLlmClient {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmClient {
    /// Replays from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        let output = next_output(&self.replayer, "llm", "complete");
        Box::pin(async move {
            decode_result::<CompletionResponse>(&output, "llm::complete").map_err(Into::into)
        })
    }
}
