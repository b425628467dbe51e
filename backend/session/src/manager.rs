//! Per-interaction state machine: `Idle → AwaitingModel → Streaming → Committed | Failed`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use triage_core::{
    CompletionClient, CompletionRequest, ConversationTurn, FragmentStream, ModelId, Result,
};
use triage_dataset::DatasetLoader;
use triage_inference::PromptComposer;

use crate::history::{ConversationHistory, ConversationSession};

/// Where a single interaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingModel,
    Streaming,
    Committed,
    Failed,
}

/// Drives user prompts through the completion client and into session history.
pub struct SessionManager {
    client: Arc<dyn CompletionClient>,
    dataset: Arc<DatasetLoader>,
}

impl SessionManager {
    pub fn new(client: Arc<dyn CompletionClient>, dataset: Arc<DatasetLoader>) -> Self {
        Self { client, dataset }
    }

    pub fn dataset(&self) -> &Arc<DatasetLoader> {
        &self.dataset
    }

    /// Build the two-message request for one prompt.
    ///
    /// The system prompt is rebuilt from the cached dataset every turn; prior turns are not sent.
    pub fn build_request(&self, model: ModelId, prompt: &str) -> Result<CompletionRequest> {
        let dataset = self.dataset.load()?;
        Ok(CompletionRequest {
            model,
            system_prompt: PromptComposer::for_dataset(dataset),
            user_prompt: prompt.to_string(),
        })
    }

    /// Record the user turn and open the model stream.
    ///
    /// The user turn is kept even when this returns an error.
    pub async fn submit<'s>(
        &self,
        session: &'s mut ConversationSession,
        model: ModelId,
        prompt: &str,
    ) -> Result<TurnStream<'s>> {
        let session_id = session.id();
        session.history.push(ConversationTurn::user(prompt));
        info!(
            %session_id,
            %model,
            client = self.client.name(),
            turn = session.history.len(),
            "User turn recorded; awaiting model"
        );

        let opened = match self.build_request(model, prompt) {
            Ok(request) => self.client.stream_completion(&request).await,
            Err(e) => Err(e),
        };

        match opened {
            Ok(inner) => {
                debug!(%session_id, "Completion stream opened");
                Ok(TurnStream::new(session_id, &mut session.history, inner))
            }
            Err(e) => {
                warn!(%session_id, error = %e, "Turn failed before streaming");
                Err(e)
            }
        }
    }

    /// Run one interaction to completion, calling `on_fragment` for each fragment.
    ///
    /// Returns the committed assistant content.
    pub async fn run_turn(
        &self,
        session: &mut ConversationSession,
        model: ModelId,
        prompt: &str,
        on_fragment: impl FnMut(&str),
    ) -> Result<String> {
        let turn = self.submit(session, model, prompt).await?;
        turn.finish(on_fragment).await
    }
}

/// The streamed assistant reply for one interaction.
///
/// Yields fragments in arrival order. On clean end of stream the concatenated
/// text is appended to history as the assistant turn. On error, or if the
/// stream is cancelled or dropped early, nothing is appended.
pub struct TurnStream<'s> {
    session_id: Uuid,
    history: &'s mut ConversationHistory,
    inner: Option<FragmentStream>,
    accumulator: String,
    fragments: usize,
    state: TurnState,
}

impl<'s> TurnStream<'s> {
    fn new(session_id: Uuid, history: &'s mut ConversationHistory, inner: FragmentStream) -> Self {
        Self {
            session_id,
            history,
            inner: Some(inner),
            accumulator: String::new(),
            fragments: 0,
            state: TurnState::Streaming,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Text received so far. Empty once the turn has failed.
    pub fn partial(&self) -> &str {
        &self.accumulator
    }

    /// Abandon the turn. History keeps only the user turn.
    pub fn cancel(mut self) -> TurnState {
        if self.state == TurnState::Streaming {
            self.fail("cancelled");
        }
        self.state
    }

    /// Drain the stream, forwarding each fragment, and return the committed content.
    pub async fn finish(mut self, mut on_fragment: impl FnMut(&str)) -> Result<String> {
        while let Some(item) = self.next().await {
            let fragment = item?;
            on_fragment(&fragment);
        }
        Ok(self
            .history
            .last()
            .map(|turn| turn.content.clone())
            .unwrap_or_default())
    }

    fn commit(&mut self) {
        self.inner = None;
        let content = std::mem::take(&mut self.accumulator);
        info!(
            session_id = %self.session_id,
            fragments = self.fragments,
            chars = content.len(),
            "Assistant turn committed"
        );
        self.history.push(ConversationTurn::assistant(content));
        self.state = TurnState::Committed;
    }

    fn fail(&mut self, reason: &str) {
        self.inner = None;
        self.accumulator.clear();
        self.state = TurnState::Failed;
        warn!(
            session_id = %self.session_id,
            fragments = self.fragments,
            reason,
            "Turn failed; partial reply discarded"
        );
    }
}

impl Stream for TurnStream<'_> {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(fragment))) => {
                this.accumulator.push_str(&fragment);
                this.fragments += 1;
                Poll::Ready(Some(Ok(fragment)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.fail(&err.to_string());
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.commit();
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for TurnStream<'_> {
    fn drop(&mut self) {
        if self.state == TurnState::Streaming {
            self.fail("dropped before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::channel::mpsc;
    use std::sync::Mutex;
    use triage_core::{Role, TriageError};
    use triage_dataset::{Dataset, IncidentTable, NO_DATA_SENTINEL};
    use triage_inference::MockClient;

    fn absent() -> Arc<DatasetLoader> {
        Arc::new(DatasetLoader::with_dataset(Dataset::Absent))
    }

    fn manager(client: MockClient) -> (SessionManager, Arc<MockClient>) {
        let client = Arc::new(client);
        (SessionManager::new(client.clone(), absent()), client)
    }

    fn roles(session: &ConversationSession) -> Vec<Role> {
        session.history().iter().map(|t| t.role).collect()
    }

    #[tokio::test]
    async fn forwards_fragments_in_order_and_commits_concatenation() {
        let (manager, _) = manager(MockClient::new(["Step ", "1: ", "Detect"]));
        let mut session = ConversationSession::new();

        let mut forwarded = Vec::new();
        let content = manager
            .run_turn(&mut session, ModelId::default(), "Analyze the database outage", |f| {
                forwarded.push(f.to_string())
            })
            .await
            .unwrap();

        assert_eq!(forwarded, vec!["Step ", "1: ", "Detect"]);
        assert_eq!(content, "Step 1: Detect");
        assert_eq!(forwarded.concat(), content);
        assert_eq!(
            session.history().turns(),
            &[
                ConversationTurn::user("Analyze the database outage"),
                ConversationTurn::assistant("Step 1: Detect"),
            ]
        );
    }

    #[tokio::test]
    async fn n_successful_turns_alternate_starting_with_user() {
        let (manager, _) = manager(MockClient::new(["ok"]));
        let mut session = ConversationSession::new();

        for i in 0..4 {
            manager
                .run_turn(&mut session, ModelId::default(), &format!("q{i}"), |_| {})
                .await
                .unwrap();
        }

        assert_eq!(session.history().len(), 8);
        for (i, role) in roles(&session).into_iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(role, expected);
        }
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_only_the_user_turn() {
        let (ok, _) = manager(MockClient::new(["fine"]));
        let (broken, _) = manager(MockClient::new(["Step ", "1: "]).failing_after(1, "connection reset"));
        let mut session = ConversationSession::new();

        for prompt in ["first", "second"] {
            ok.run_turn(&mut session, ModelId::default(), prompt, |_| {})
                .await
                .unwrap();
        }

        let mut forwarded = Vec::new();
        let err = broken
            .run_turn(&mut session, ModelId::default(), "third", |f| forwarded.push(f.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, TriageError::Request { .. }));
        assert_eq!(forwarded, vec!["Step "]);
        // 2 * (k - 1) + 1 with k = 3
        assert_eq!(session.history().len(), 5);
        assert_eq!(session.history().last(), Some(&ConversationTurn::user("third")));

        // The session stays usable.
        ok.run_turn(&mut session, ModelId::default(), "fourth", |_| {})
            .await
            .unwrap();
        assert_eq!(session.history().len(), 7);
    }

    #[tokio::test]
    async fn error_is_yielded_once_then_stream_ends() {
        let (manager, _) = manager(MockClient::new(["a", "b"]).failing_after(1, "boom"));
        let mut session = ConversationSession::new();

        let mut turn = manager.submit(&mut session, ModelId::default(), "q").await.unwrap();
        assert_eq!(turn.next().await.unwrap().unwrap(), "a");
        assert_eq!(turn.partial(), "a");
        assert!(turn.next().await.unwrap().is_err());
        assert_eq!(turn.state(), TurnState::Failed);
        assert_eq!(turn.partial(), "");
        assert!(turn.next().await.is_none());
        drop(turn);

        assert_eq!(roles(&session), vec![Role::User]);
    }

    #[tokio::test]
    async fn rejected_request_keeps_user_turn() {
        let (manager, _) = manager(MockClient::new(["x"]).rejecting(Some(429), "rate limited"));
        let mut session = ConversationSession::new();

        let err = manager
            .submit(&mut session, ModelId::default(), "q")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TriageError::Request { status: Some(429), .. }));
        assert_eq!(session.history().turns(), &[ConversationTurn::user("q")]);
    }

    #[tokio::test]
    async fn dropping_or_cancelling_mid_stream_appends_nothing() {
        let (manager, _) = manager(MockClient::new(["a", "b", "c"]));
        let mut session = ConversationSession::new();

        let mut turn = manager.submit(&mut session, ModelId::default(), "one").await.unwrap();
        turn.next().await.unwrap().unwrap();
        assert_eq!(turn.cancel(), TurnState::Failed);

        let mut turn = manager.submit(&mut session, ModelId::default(), "two").await.unwrap();
        turn.next().await.unwrap().unwrap();
        drop(turn);

        assert_eq!(roles(&session), vec![Role::User, Role::User]);
    }

    #[tokio::test]
    async fn sends_only_system_prompt_and_latest_message() {
        let (manager, client) = manager(MockClient::new(["ok"]));
        let mut session = ConversationSession::new();

        manager
            .run_turn(&mut session, ModelId::default(), "Analyze the database outage", |_| {})
            .await
            .unwrap();
        manager
            .run_turn(&mut session, ModelId::Llama31_8bInstant, "What about the cache?", |_| {})
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].system_prompt.contains(NO_DATA_SENTINEL));
        assert_eq!(requests[1].user_prompt, "What about the cache?");
        assert_eq!(requests[1].model, ModelId::Llama31_8bInstant);
        assert!(!requests[1].system_prompt.contains("Analyze the database outage"));
        assert_eq!(requests[0].system_prompt, requests[1].system_prompt);
    }

    #[tokio::test]
    async fn dataset_is_read_once_across_turns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incidents.csv");
        std::fs::write(&path, "id,service\nINC-7,payments-db\n").unwrap();

        let client = Arc::new(MockClient::new(["ok"]));
        let manager = SessionManager::new(client.clone(), Arc::new(DatasetLoader::new(&path)));
        let mut session = ConversationSession::new();

        manager.run_turn(&mut session, ModelId::default(), "a", |_| {}).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        manager.run_turn(&mut session, ModelId::default(), "b", |_| {}).await.unwrap();

        for request in client.requests() {
            assert!(request.system_prompt.contains("payments-db"));
        }
    }

    #[tokio::test]
    async fn unreadable_dataset_fails_turn_without_calling_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incidents.csv");
        std::fs::write(&path, "id,service\n1,db,extra\n").unwrap();

        let client = Arc::new(MockClient::new(["ok"]));
        let manager = SessionManager::new(client.clone(), Arc::new(DatasetLoader::new(&path)));
        let mut session = ConversationSession::new();

        let err = manager
            .run_turn(&mut session, ModelId::default(), "q", |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::Dataset(_)));
        assert!(client.requests().is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn table_context_is_embedded() {
        let table = IncidentTable::new(
            vec!["service".into(), "severity".into()],
            vec![vec!["database".into(), "sev1".into()]],
        );
        let client = Arc::new(MockClient::new(["ok"]));
        let manager = SessionManager::new(
            client.clone(),
            Arc::new(DatasetLoader::with_dataset(Dataset::Present(table))),
        );
        let request = manager.build_request(ModelId::default(), "q").unwrap();
        assert!(request.system_prompt.contains("database"));
        assert!(request.system_prompt.contains("sev1"));
    }

    /// Hands out a stream fed by the test, to observe fragments before the reply ends.
    struct ChannelClient {
        rx: Mutex<Option<mpsc::UnboundedReceiver<Result<String>>>>,
    }

    #[async_trait]
    impl CompletionClient for ChannelClient {
        fn name(&self) -> &str {
            "channel"
        }

        async fn stream_completion(&self, _request: &CompletionRequest) -> Result<FragmentStream> {
            let rx = self.rx.lock().unwrap().take().expect("single use");
            Ok(Box::pin(rx))
        }
    }

    #[tokio::test]
    async fn fragments_arrive_before_the_reply_completes() {
        let (tx, rx) = mpsc::unbounded();
        let client = Arc::new(ChannelClient {
            rx: Mutex::new(Some(rx)),
        });
        let manager = SessionManager::new(client, absent());
        let mut session = ConversationSession::new();

        let mut turn = manager.submit(&mut session, ModelId::default(), "q").await.unwrap();
        tx.unbounded_send(Ok("first".to_string())).unwrap();
        assert_eq!(turn.next().await.unwrap().unwrap(), "first");
        assert_eq!(turn.state(), TurnState::Streaming);

        tx.unbounded_send(Ok(" second".to_string())).unwrap();
        drop(tx);
        assert_eq!(turn.next().await.unwrap().unwrap(), " second");
        assert!(turn.next().await.is_none());
        assert_eq!(turn.state(), TurnState::Committed);
        drop(turn);

        assert_eq!(
            session.history().last(),
            Some(&ConversationTurn::assistant("first second"))
        );
    }
}
