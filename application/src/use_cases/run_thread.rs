//! Run Thread use case.
//!
//! Drives a single conversational-assistant exchange to completion:
//! create a thread, submit the request messages, start a run, poll to a
//! terminal state, fetch the answer.
//!
//! The poll loop is an explicit two-state machine — {non-terminal} → wait →
//! retrieve → {non-terminal | terminal} — bounded by `max_attempts` and
//! honoring a cancellation token at every wait point, so a disconnected
//! caller stops consuming provider calls. The wait goes through the
//! injected [`Clock`] port, never a direct sleep.

use crate::config::PollSettings;
use crate::ports::assistant_provider::{AssistantProvider, ProviderError};
use crate::ports::clock::Clock;
use sermonsmith_domain::util::preview;
use sermonsmith_domain::{ChatMessage, Role, Run, RunStatus, ThreadId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur while driving an exchange.
#[derive(Error, Debug)]
pub enum RunThreadError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The run never reached a terminal state within the attempt budget.
    /// Fatal and non-retryable; carries the elapsed attempts for diagnosis.
    #[error("run did not reach a terminal state after {attempts} retrievals at {interval:?} intervals")]
    Timeout { attempts: u32, interval: Duration },

    /// The run ended, but not in `completed`.
    #[error("run ended with status {0}")]
    RunNotCompleted(RunStatus),

    #[error("assistant returned an empty response")]
    EmptyResponse,

    #[error("message content must be non-empty")]
    EmptyMessage,

    #[error("operation cancelled")]
    Cancelled,
}

/// Input for the [`RunThreadUseCase`].
#[derive(Debug, Clone)]
pub struct RunThreadInput {
    /// Ordered messages to submit before starting the run.
    pub messages: Vec<ChatMessage>,
    pub assistant_id: String,
    /// Per-run framing; never mutates the assistant's persistent config.
    pub instructions: Option<String>,
    pub poll: PollSettings,
}

/// Use case for one full assistant exchange. Holds no state between calls —
/// thread and run identity live only inside [`execute`](Self::execute).
pub struct RunThreadUseCase {
    provider: Arc<dyn AssistantProvider>,
    clock: Arc<dyn Clock>,
}

impl RunThreadUseCase {
    pub fn new(provider: Arc<dyn AssistantProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    /// Execute the exchange, returning the assistant's answer text.
    pub async fn execute(
        &self,
        input: RunThreadInput,
        cancel: &CancellationToken,
    ) -> Result<String, RunThreadError> {
        let thread_id = self.provider.create_thread().await?;
        debug!(thread = %thread_id, "created thread");

        for message in &input.messages {
            self.submit_message(&thread_id, message).await?;
        }

        let run = self
            .provider
            .create_run(&thread_id, &input.assistant_id, input.instructions.as_deref())
            .await?;
        info!(thread = %thread_id, run = %run.id, status = %run.status, "run started");

        let run = self.poll(&thread_id, run, &input.poll, cancel).await?;
        if run.status != RunStatus::Completed {
            return Err(RunThreadError::RunNotCompleted(run.status));
        }

        let answer = self.fetch_latest_assistant_message(&thread_id).await?;
        debug!(thread = %thread_id, answer = %preview(&answer, 80), "exchange complete");
        Ok(answer)
    }

    /// Append one message to the thread. Content must be non-empty text.
    pub async fn submit_message(
        &self,
        thread_id: &ThreadId,
        message: &ChatMessage,
    ) -> Result<(), RunThreadError> {
        if message.content.trim().is_empty() {
            return Err(RunThreadError::EmptyMessage);
        }
        self.provider.add_message(thread_id, message).await?;
        Ok(())
    }

    /// Poll the run until it reports a terminal status.
    ///
    /// Returns on the exact iteration the provider first reports a terminal
    /// status — including iteration zero, when `run` is already terminal —
    /// and never performs more than `max_attempts` retrievals.
    pub async fn poll(
        &self,
        thread_id: &ThreadId,
        mut run: Run,
        settings: &PollSettings,
        cancel: &CancellationToken,
    ) -> Result<Run, RunThreadError> {
        if run.status.is_terminal() {
            return Ok(run);
        }

        for attempt in 1..=settings.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RunThreadError::Cancelled),
                _ = self.clock.sleep(settings.interval) => {}
            }
            run = self.provider.retrieve_run(thread_id, &run.id).await?;
            debug!(attempt, status = %run.status, "polled run");
            if run.status.is_terminal() {
                return Ok(run);
            }
        }

        Err(RunThreadError::Timeout {
            attempts: settings.max_attempts,
            interval: settings.interval,
        })
    }

    /// Fetch the most recently created assistant-authored message and
    /// concatenate its text segments.
    pub async fn fetch_latest_assistant_message(
        &self,
        thread_id: &ThreadId,
    ) -> Result<String, RunThreadError> {
        let messages = self.provider.list_messages(thread_id).await?;
        let text = messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .max_by_key(|m| m.created_at)
            .map(|m| m.text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RunThreadError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::assistant_provider::{ContentSegment, ThreadMessage};
    use async_trait::async_trait;
    use sermonsmith_domain::RunId;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    // -- Mock provider ---------------------------------------------------

    struct ScriptedProvider {
        /// Status returned by `create_run`.
        initial: RunStatus,
        /// Statuses returned by successive `retrieve_run` calls; when the
        /// script runs dry the run stays in progress.
        script: Mutex<VecDeque<RunStatus>>,
        retrievals: AtomicU32,
        messages: Mutex<Vec<ThreadMessage>>,
        submitted: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedProvider {
        fn new(initial: RunStatus, script: Vec<RunStatus>) -> Self {
            Self {
                initial,
                script: Mutex::new(script.into()),
                retrievals: AtomicU32::new(0),
                messages: Mutex::new(Vec::new()),
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn with_messages(self, messages: Vec<ThreadMessage>) -> Self {
            *self.messages.lock().unwrap() = messages;
            self
        }

        fn retrieval_count(&self) -> u32 {
            self.retrievals.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssistantProvider for ScriptedProvider {
        async fn create_thread(&self) -> Result<ThreadId, ProviderError> {
            Ok(ThreadId::new("thread_1"))
        }

        async fn add_message(
            &self,
            _thread_id: &ThreadId,
            message: &ChatMessage,
        ) -> Result<(), ProviderError> {
            self.submitted.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn create_run(
            &self,
            _thread_id: &ThreadId,
            _assistant_id: &str,
            _instructions: Option<&str>,
        ) -> Result<Run, ProviderError> {
            Ok(Run::new(RunId::new("run_1"), self.initial))
        }

        async fn retrieve_run(
            &self,
            _thread_id: &ThreadId,
            run_id: &RunId,
        ) -> Result<Run, ProviderError> {
            self.retrievals.fetch_add(1, Ordering::SeqCst);
            let status = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(RunStatus::InProgress);
            Ok(Run::new(run_id.clone(), status))
        }

        async fn list_messages(
            &self,
            _thread_id: &ThreadId,
        ) -> Result<Vec<ThreadMessage>, ProviderError> {
            Ok(self.messages.lock().unwrap().clone())
        }
    }

    // -- Mock clocks -----------------------------------------------------

    /// Returns immediately and counts how often it was asked to wait.
    struct ManualClock {
        sleeps: AtomicU32,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                sleeps: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        async fn sleep(&self, _duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Never completes a sleep; pairs with cancellation tests.
    struct NeverClock;

    #[async_trait]
    impl Clock for NeverClock {
        async fn sleep(&self, _duration: Duration) {
            std::future::pending::<()>().await;
        }
    }

    // -- Helpers ---------------------------------------------------------

    fn assistant_text(created_at: i64, text: &str) -> ThreadMessage {
        ThreadMessage {
            role: Role::Assistant,
            created_at,
            content: vec![ContentSegment::Text(text.to_string())],
        }
    }

    fn settings(max_attempts: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(10),
            max_attempts,
        }
    }

    fn input(max_attempts: u32) -> RunThreadInput {
        RunThreadInput {
            messages: vec![ChatMessage::user("Write a sermon on John 3:16")],
            assistant_id: "asst_test".to_string(),
            instructions: None,
            poll: settings(max_attempts),
        }
    }

    // -- Poll state machine ----------------------------------------------

    #[tokio::test]
    async fn poll_returns_on_first_terminal_retrieval() {
        let provider = Arc::new(ScriptedProvider::new(
            RunStatus::Queued,
            vec![RunStatus::InProgress, RunStatus::Completed],
        ));
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(ManualClock::new()));

        let run = use_case
            .poll(
                &ThreadId::new("thread_1"),
                Run::new(RunId::new("run_1"), RunStatus::Queued),
                &settings(10),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(provider.retrieval_count(), 2);
    }

    #[tokio::test]
    async fn poll_skips_retrieval_when_already_terminal() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::Completed, vec![]));
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(ManualClock::new()));

        let run = use_case
            .poll(
                &ThreadId::new("thread_1"),
                Run::new(RunId::new("run_1"), RunStatus::Completed),
                &settings(10),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(provider.retrieval_count(), 0);
    }

    #[tokio::test]
    async fn poll_times_out_after_max_attempts() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::InProgress, vec![]));
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(ManualClock::new()));

        let result = use_case
            .poll(
                &ThreadId::new("thread_1"),
                Run::new(RunId::new("run_1"), RunStatus::InProgress),
                &settings(1),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(RunThreadError::Timeout { attempts: 1, .. })
        ));
        assert_eq!(provider.retrieval_count(), 1);
    }

    #[tokio::test]
    async fn poll_never_exceeds_attempt_budget() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::InProgress, vec![]));
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(ManualClock::new()));

        let result = use_case
            .poll(
                &ThreadId::new("thread_1"),
                Run::new(RunId::new("run_1"), RunStatus::InProgress),
                &settings(5),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(RunThreadError::Timeout { .. })));
        assert_eq!(provider.retrieval_count(), 5);
    }

    #[tokio::test]
    async fn poll_stops_on_cancellation() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::InProgress, vec![]));
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(NeverClock));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = use_case
            .poll(
                &ThreadId::new("thread_1"),
                Run::new(RunId::new("run_1"), RunStatus::InProgress),
                &settings(100),
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(RunThreadError::Cancelled)));
        assert_eq!(provider.retrieval_count(), 0);
    }

    // -- Full exchange ---------------------------------------------------

    #[tokio::test]
    async fn execute_returns_latest_assistant_answer() {
        let provider = Arc::new(
            ScriptedProvider::new(RunStatus::Queued, vec![RunStatus::Completed]).with_messages(
                vec![
                    assistant_text(100, "Older answer"),
                    ThreadMessage {
                        role: Role::User,
                        created_at: 150,
                        content: vec![ContentSegment::Text("the question".to_string())],
                    },
                    assistant_text(200, "Newest answer"),
                ],
            ),
        );
        let use_case = RunThreadUseCase::new(provider.clone(), Arc::new(ManualClock::new()));

        let answer = use_case
            .execute(input(10), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer, "Newest answer");
        assert_eq!(provider.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn execute_concatenates_text_segments_in_order() {
        let provider = Arc::new(
            ScriptedProvider::new(RunStatus::Completed, vec![]).with_messages(vec![ThreadMessage {
                role: Role::Assistant,
                created_at: 10,
                content: vec![
                    ContentSegment::Text("Part one.".to_string()),
                    ContentSegment::Unsupported,
                    ContentSegment::Text("Part two.".to_string()),
                ],
            }]),
        );
        let use_case = RunThreadUseCase::new(provider, Arc::new(ManualClock::new()));

        let answer = use_case
            .execute(input(10), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer, "Part one.\nPart two.");
    }

    #[tokio::test]
    async fn execute_fails_on_empty_answer() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::Completed, vec![]));
        let use_case = RunThreadUseCase::new(provider, Arc::new(ManualClock::new()));

        let result = use_case.execute(input(10), &CancellationToken::new()).await;
        assert!(matches!(result, Err(RunThreadError::EmptyResponse)));
    }

    #[tokio::test]
    async fn execute_fails_on_non_completed_terminal_state() {
        let provider = Arc::new(ScriptedProvider::new(
            RunStatus::Queued,
            vec![RunStatus::Expired],
        ));
        let use_case = RunThreadUseCase::new(provider, Arc::new(ManualClock::new()));

        let result = use_case.execute(input(10), &CancellationToken::new()).await;
        assert!(matches!(
            result,
            Err(RunThreadError::RunNotCompleted(RunStatus::Expired))
        ));
    }

    #[tokio::test]
    async fn submit_message_rejects_empty_content() {
        let provider = Arc::new(ScriptedProvider::new(RunStatus::Completed, vec![]));
        let use_case = RunThreadUseCase::new(provider, Arc::new(ManualClock::new()));

        let result = use_case
            .submit_message(&ThreadId::new("thread_1"), &ChatMessage::user("   "))
            .await;
        assert!(matches!(result, Err(RunThreadError::EmptyMessage)));
    }
}
