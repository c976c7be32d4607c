//! Draft-generation gateway.
//!
//! Turns a step's email template plus ticket context into a prompt, asks a
//! [`TextGenerator`] for text and parses the result into an [`EmailDraft`].
//! Calls are one-shot: no retries, no caching. Failures come back as a
//! [`GatewayError`]; callers that only want text use
//! [`DraftGateway::draft_or_default`] and let the user write the email by hand.

mod prompt;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

pub use prompt::{DraftRequest, build_prompt};

use crate::gemini::{GeminiError, TextGenerator};

/// Subject used when the generated text does not provide one.
pub const DEFAULT_SUBJECT: &str = "One Team Personnel Change";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Generation(#[from] GeminiError),

    #[error("draft generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("draft generation was cancelled")]
    Cancelled,

    #[error("missing {0} for this email template")]
    MissingContext(&'static str),
}

/// A generated (or hand-written) email, split into subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    /// Blank draft with the default subject.
    pub fn empty() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            body: String::new(),
        }
    }

    /// Pulls the first `Subject:` line out of generated text; the remaining
    /// lines become the body.
    pub fn parse(text: &str) -> Self {
        let mut subject = None;
        let mut body_lines = Vec::new();
        for line in text.lines() {
            if subject.is_none() {
                let bare = line.trim().trim_start_matches(['*', '#', ' ']);
                if let Some(rest) = bare.strip_prefix("Subject:") {
                    subject = Some(
                        rest.trim_matches(|c: char| c == '*' || c.is_whitespace())
                            .to_string(),
                    );
                    continue;
                }
            }
            body_lines.push(line);
        }
        Self {
            subject: subject
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            body: body_lines.join("\n").trim().to_string(),
        }
    }

    /// Subject and body recombined, as kept in the activity history.
    pub fn history_snapshot(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }
}

/// Wraps a [`TextGenerator`] with prompt building, a time bound and
/// cancellation.
#[derive(Debug, Clone)]
pub struct DraftGateway<G> {
    generator: G,
    timeout: Duration,
}

impl<G: TextGenerator> DraftGateway<G> {
    pub fn new(generator: G, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn draft(&self, req: &DraftRequest) -> Result<EmailDraft, GatewayError> {
        let prompt = build_prompt(req)?;
        debug!(template = ?req.template, "requesting email draft");
        match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(result) => Ok(EmailDraft::parse(&result?)),
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        }
    }

    /// Like [`draft`](Self::draft), but gives up as soon as `cancel`
    /// resolves. A cancelled result is never returned.
    pub async fn draft_until<F>(&self, req: &DraftRequest, cancel: F) -> Result<EmailDraft, GatewayError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!(template = ?req.template, "email draft cancelled");
                Err(GatewayError::Cancelled)
            }
            result = self.draft(req) => result,
        }
    }

    /// Never fails: any gateway error is logged and replaced by an empty draft.
    pub async fn draft_or_default(&self, req: &DraftRequest) -> EmailDraft {
        match self.draft(req).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(template = ?req.template, error = %e, "could not generate email draft");
                EmailDraft::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::EmailTemplate;

    struct MockGenerator {
        result: Result<String, u16>,
        delay: Duration,
    }

    impl MockGenerator {
        fn ok(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                delay: Duration::ZERO,
            }
        }

        fn err(status: u16) -> Self {
            Self {
                result: Err(status),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                result: Ok("late".to_string()),
                delay,
            }
        }
    }

    impl TextGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GeminiError> {
            tokio::time::sleep(self.delay).await;
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GeminiError::ApiError {
                    status: *status,
                    message: "mock error".to_string(),
                }),
            }
        }
    }

    fn request(template: EmailTemplate) -> DraftRequest {
        DraftRequest {
            template,
            employee_name: "Alex Moreno".into(),
            manager_name: "Priya Shah".into(),
            replacement_name: None,
            ticket_id: "RITM0042".into(),
        }
    }

    #[test]
    fn parse_extracts_subject_line() {
        let draft = EmailDraft::parse("Subject: Personnel Change\n\nHello team,\nAlex is leaving.");
        assert_eq!(draft.subject, "Personnel Change");
        assert_eq!(draft.body, "Hello team,\nAlex is leaving.");
    }

    #[test]
    fn parse_handles_markdown_subject() {
        let draft = EmailDraft::parse("**Subject:** Retire Delegate\nBody");
        assert_eq!(draft.subject, "Retire Delegate");
        assert_eq!(draft.body, "Body");
    }

    #[test]
    fn parse_without_subject_uses_default() {
        let draft = EmailDraft::parse("Just a body");
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.body, "Just a body");
    }

    #[test]
    fn history_snapshot_recombines() {
        let draft = EmailDraft {
            subject: "Hi".into(),
            body: "Body".into(),
        };
        assert_eq!(draft.history_snapshot(), "Subject: Hi\n\nBody");
    }

    #[tokio::test]
    async fn draft_success() {
        let gateway = DraftGateway::new(
            MockGenerator::ok("Subject: Notice\n\nAlex is leaving."),
            Duration::from_secs(5),
        );
        let draft = gateway.draft(&request(EmailTemplate::ManagerNotifyOsi)).await.unwrap();
        assert_eq!(draft.subject, "Notice");
        assert_eq!(draft.body, "Alex is leaving.");
    }

    #[tokio::test]
    async fn draft_surfaces_generation_error() {
        let gateway = DraftGateway::new(MockGenerator::err(500), Duration::from_secs(5));
        let err = gateway
            .draft(&request(EmailTemplate::GfsRetire))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Generation(GeminiError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn draft_times_out() {
        let gateway = DraftGateway::new(
            MockGenerator::slow(Duration::from_millis(500)),
            Duration::from_millis(20),
        );
        let err = gateway
            .draft(&request(EmailTemplate::GfsRetire))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
    }

    #[tokio::test]
    async fn cancelled_draft_is_discarded() {
        let gateway = DraftGateway::new(
            MockGenerator::slow(Duration::from_millis(200)),
            Duration::from_secs(5),
        );
        let err = gateway
            .draft_until(&request(EmailTemplate::GfsRetire), async {})
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));
    }

    #[tokio::test]
    async fn uncancelled_draft_completes() {
        let gateway = DraftGateway::new(MockGenerator::ok("Body only"), Duration::from_secs(5));
        let draft = gateway
            .draft_until(
                &request(EmailTemplate::GfsRetire),
                std::future::pending::<()>(),
            )
            .await
            .unwrap();
        assert_eq!(draft.body, "Body only");
    }

    #[tokio::test]
    async fn missing_context_never_calls_generator() {
        let gateway = DraftGateway::new(
            MockGenerator::slow(Duration::from_secs(60)),
            Duration::from_secs(120),
        );
        let err = gateway
            .draft(&request(EmailTemplate::MdApproval))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingContext(_)));
    }

    #[tokio::test]
    async fn draft_or_default_degrades_to_empty() {
        let gateway = DraftGateway::new(MockGenerator::err(503), Duration::from_secs(5));
        let draft = gateway
            .draft_or_default(&request(EmailTemplate::ManagerNotifyOsi))
            .await;
        assert_eq!(draft, EmailDraft::empty());
    }
}
