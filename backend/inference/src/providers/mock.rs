use std::sync::Mutex;

use async_trait::async_trait;
use triage_core::{CompletionClient, CompletionRequest, FragmentStream, Result, TriageError};

/// A completion client that replays canned fragments.
///
/// Records every request it receives so callers can inspect what was sent.
#[derive(Default)]
pub struct MockClient {
    fragments: Vec<String>,
    fail_after: Option<(usize, String)>,
    reject_with: Option<(Option<u16>, String)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockClient {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Emit the first `count` fragments, then fail the stream.
    pub fn failing_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((count, message.into()));
        self
    }

    /// Refuse to open the stream at all.
    pub fn rejecting(mut self, status: Option<u16>, message: impl Into<String>) -> Self {
        self.reject_with = Some((status, message.into()));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_completion(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }

        if let Some((status, message)) = &self.reject_with {
            return Err(TriageError::Request {
                status: *status,
                message: message.clone(),
            });
        }

        let mut items: Vec<Result<String>> = match &self.fail_after {
            Some((count, _)) => self.fragments.iter().take(*count).cloned().map(Ok).collect(),
            None => self.fragments.iter().cloned().map(Ok).collect(),
        };
        if let Some((_, message)) = &self.fail_after {
            items.push(Err(TriageError::request(message.clone())));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
