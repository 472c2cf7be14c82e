//! Generate use case — the fallback cascade.
//!
//! Chooses a route (primary assistant exchange vs. secondary single-shot
//! completion), transparently reroutes a missing-assistant failure on the
//! primary path to the secondary provider exactly once, and shapes the raw
//! answer per the requested output shape. This is the only component that
//! catches and locally resolves a provider error; everything else
//! propagates as a typed [`ErrorReport`].

use crate::config::{GenerationConfig, Route};
use crate::ports::assistant_provider::{AssistantProvider, ProviderError};
use crate::ports::clock::Clock;
use crate::ports::completion_provider::{CompletionParams, CompletionProvider};
use crate::use_cases::run_thread::{RunThreadError, RunThreadInput, RunThreadUseCase};
use sermonsmith_domain::util::preview;
use sermonsmith_domain::{
    ChatMessage, ErrorKind, ErrorReport, GenerationRequest, OutputShape, StructuredDocument,
    Subject, classify, extract_document, looks_like_json, parse_document_json,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failure surface of the cascade: every provider failure arrives as a
/// classified report; cancellation is the caller's own doing.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Report(#[from] ErrorReport),

    #[error("operation cancelled")]
    Cancelled,
}

/// What came back, per the requested shape.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    /// Structured requests always yield a complete document.
    Document(StructuredDocument),
    /// Freeform requests return the answer verbatim.
    Text(String),
}

/// Result of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub output: GenerationOutput,
    /// The route originally decided for the request.
    pub route: Route,
    /// True when a primary failure was transparently served by the
    /// secondary provider.
    pub used_secondary: bool,
}

/// Use case for one generation request, end to end.
///
/// Both providers are shared, constructor-injected singletons; all other
/// state is request-local.
pub struct GenerateUseCase {
    assistant: Arc<dyn AssistantProvider>,
    completion: Arc<dyn CompletionProvider>,
    clock: Arc<dyn Clock>,
    config: GenerationConfig,
}

impl GenerateUseCase {
    pub fn new(
        assistant: Arc<dyn AssistantProvider>,
        completion: Arc<dyn CompletionProvider>,
        clock: Arc<dyn Clock>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            assistant,
            completion,
            clock,
            config,
        }
    }

    /// Execute the request: decide route, run it, reroute a
    /// missing-assistant primary failure once, shape the output.
    ///
    /// Guarantee: at most one reroute per request; secondary failures are
    /// never cascaded further.
    pub async fn execute(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerateError> {
        let route = self.config.resolve_route(&request.route);
        debug!(?route, shape = ?request.shape, "route decided");

        let (text, used_secondary) = match route {
            Route::Primary => match self.run_primary(&request, cancel).await {
                Ok(text) => (text, false),
                Err(RunThreadError::Cancelled) => return Err(GenerateError::Cancelled),
                Err(error) => {
                    let report = report_from_run_error(error);
                    if report.kind == ErrorKind::EntityNotFound {
                        warn!(
                            message = %report.message,
                            "assistant missing on primary path; rerouting to single-shot provider"
                        );
                        let text = self
                            .run_secondary(&request)
                            .await
                            .map_err(report_from_provider_error)?;
                        (text, true)
                    } else {
                        return Err(report.into());
                    }
                }
            },
            Route::Secondary => {
                let text = self
                    .run_secondary(&request)
                    .await
                    .map_err(report_from_provider_error)?;
                (text, false)
            }
        };

        info!(
            used_secondary,
            answer = %preview(&text, 80),
            "generation complete"
        );

        let output = match request.shape {
            OutputShape::Freeform => GenerationOutput::Text(text),
            OutputShape::Structured => {
                GenerationOutput::Document(self.shape_document(&request, text).await)
            }
        };

        Ok(GenerationOutcome {
            output,
            route,
            used_secondary,
        })
    }

    async fn run_primary(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RunThreadError> {
        let runner = RunThreadUseCase::new(self.assistant.clone(), self.clock.clone());
        let input = RunThreadInput {
            messages: request.messages.clone(),
            assistant_id: self.config.assistant_id().to_string(),
            instructions: request.instructions.clone(),
            poll: self.config.poll,
        };
        runner.execute(input, cancel).await
    }

    async fn run_secondary(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(instructions) = &request.instructions {
            messages.push(ChatMessage::system(instructions));
        }
        messages.extend(request.messages.iter().cloned());

        let params = match &self.config.completion_model {
            Some(model) => CompletionParams::for_model(model),
            None => CompletionParams::default(),
        };
        self.completion.complete(&messages, &params).await
    }

    /// Shape a raw answer into a complete document.
    ///
    /// JSON-shaped answers are validated strictly; a validation failure
    /// earns exactly one corrective re-prompt (single-shot), after which
    /// the heuristic extractor takes over unconditionally. This path can
    /// never fail the request.
    async fn shape_document(
        &self,
        request: &GenerationRequest,
        text: String,
    ) -> StructuredDocument {
        let subject = subject_of(request);

        if let Some(document) = parse_document_json(&text, &subject) {
            return document;
        }

        if looks_like_json(&text) {
            debug!("answer looks like JSON but failed schema validation; re-prompting once");
            match self.reprompt_for_valid_json(&text).await {
                Ok(repaired) => {
                    if let Some(document) = parse_document_json(&repaired, &subject) {
                        return document;
                    }
                    warn!("corrective re-prompt still malformed; using heuristic extraction");
                }
                Err(error) => {
                    warn!(%error, "corrective re-prompt failed; using heuristic extraction");
                }
            }
        }

        extract_document(&text, &subject, request.title.as_deref())
    }

    async fn reprompt_for_valid_json(&self, malformed: &str) -> Result<String, ProviderError> {
        let messages = [
            ChatMessage::system(
                "You repair malformed JSON. Respond with only the corrected JSON \
                 object, preserving all content exactly. Do not add commentary.",
            ),
            ChatMessage::user(malformed),
        ];
        self.completion
            .complete(&messages, &CompletionParams::default())
            .await
    }
}

/// The extraction anchor for a request: its subject when present, otherwise
/// a short form of the first user message.
fn subject_of(request: &GenerationRequest) -> Subject {
    if let Some(subject) = &request.subject {
        return subject.clone();
    }
    request
        .messages
        .iter()
        .find(|m| m.role == sermonsmith_domain::Role::User)
        .and_then(|m| Subject::try_new(preview(m.content.trim(), 80)))
        .unwrap_or_else(|| Subject::new("the passage"))
}

fn report_from_provider_error(error: ProviderError) -> ErrorReport {
    let status = error.status();
    let message = match &error {
        ProviderError::Status { message, .. } => message.clone(),
        other => other.to_string(),
    };
    classify(&message, status)
}

fn report_from_run_error(error: RunThreadError) -> ErrorReport {
    match error {
        RunThreadError::Provider(provider_error) => report_from_provider_error(provider_error),
        timeout @ RunThreadError::Timeout { .. } => ErrorReport {
            kind: ErrorKind::Unknown,
            message: timeout.to_string(),
            recommendation: "The provider is taking too long; raise the poll budget or try later."
                .to_string(),
            retryable: false,
            fatal: true,
        },
        other => classify(&other.to_string(), None),
    }
}
