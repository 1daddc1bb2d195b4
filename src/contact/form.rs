//! Contact form state machine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::relay::{Relay, RelayError, RelayMessage};
use super::validation::{validate_email, validate_message, validate_name};

/// Default sender label of relayed messages
pub const DEFAULT_FROM_NAME: &str = "Portfolio Contact Form";

/// Editable inputs of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
    /// Hidden from people; anything typed here marks the sender as a bot
    Honeypot,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
            Field::Honeypot => "honeypot",
        };
        f.write_str(name)
    }
}

/// Per-field validation messages
pub type FieldErrors = BTreeMap<Field, String>;

/// Current values of the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub message: String,
    pub honeypot: String,
}

impl ContactFields {
    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
            Field::Honeypot => &mut self.honeypot,
        }
    }

    /// Validate the visible fields
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(e) = validate_name(&self.name) {
            errors.insert(Field::Name, e);
        }
        if let Some(e) = validate_email(&self.email) {
            errors.insert(Field::Email, e);
        }
        if let Some(e) = validate_message(&self.message) {
            errors.insert(Field::Message, e);
        }
        errors
    }
}

/// Observable state of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "lowercase")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// A relay call the form is waiting on
#[derive(Debug)]
pub struct PendingSubmission {
    generation: u64,
    pub message: RelayMessage,
}

/// Result of trying to submit
#[derive(Debug)]
pub enum SubmitAttempt {
    /// A relay call is already outstanding
    Busy,
    /// The honeypot was filled; nothing happens
    Ignored,
    /// Validation failed; errors are on the form
    Invalid(FieldErrors),
    /// The form is now submitting; send `message` and hand the result to `finish`
    Ready(PendingSubmission),
}

/// One visitor's contact form
#[derive(Debug)]
pub struct ContactForm {
    fields: ContactFields,
    errors: FieldErrors,
    state: SubmissionState,
    from_name: String,
    generation: u64,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(DEFAULT_FROM_NAME)
    }
}

impl ContactForm {
    pub fn new(from_name: impl Into<String>) -> Self {
        Self {
            fields: ContactFields::default(),
            errors: FieldErrors::new(),
            state: SubmissionState::Idle,
            from_name: from_name.into(),
            generation: 0,
        }
    }

    /// Form pre-filled with the given values
    pub fn with_fields(from_name: impl Into<String>, fields: ContactFields) -> Self {
        Self {
            fields,
            ..Self::new(from_name)
        }
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.state != SubmissionState::Submitting
    }

    /// Update one field and clear its error. Editing dismisses a failure banner.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        *self.fields.slot(field) = value.into();
        self.errors.remove(&field);
        if matches!(self.state, SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Start a submission.
    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if self.state == SubmissionState::Submitting {
            return SubmitAttempt::Busy;
        }

        if !self.fields.honeypot.is_empty() {
            tracing::debug!("Honeypot filled, dropping submission");
            return SubmitAttempt::Ignored;
        }

        let errors = self.fields.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            self.state = SubmissionState::Idle;
            return SubmitAttempt::Invalid(errors);
        }

        self.errors.clear();
        self.state = SubmissionState::Submitting;
        SubmitAttempt::Ready(PendingSubmission {
            generation: self.generation,
            message: RelayMessage {
                name: self.fields.name.clone(),
                email: self.fields.email.clone(),
                message: self.fields.message.clone(),
                from_name: self.from_name.clone(),
                subject: format!("New Contact Form Submission from {}", self.fields.name),
            },
        })
    }

    /// Apply the relay outcome. Returns false when the ticket is stale and
    /// nothing was applied.
    pub fn finish(&mut self, pending: PendingSubmission, result: Result<(), RelayError>) -> bool {
        if pending.generation != self.generation || self.state != SubmissionState::Submitting {
            tracing::debug!("Discarding late relay response");
            return false;
        }

        match result {
            Ok(()) => {
                self.fields = ContactFields::default();
                self.state = SubmissionState::Succeeded;
            }
            Err(e) => {
                tracing::error!("Contact submission failed: {}", e);
                self.state = SubmissionState::Failed(e.to_string());
            }
        }
        true
    }

    /// Return to an empty idle form. Outstanding submissions are abandoned.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.fields = ContactFields::default();
        self.errors.clear();
        self.state = SubmissionState::Idle;
    }

    /// Validate and, if everything passes, send through `relay`
    pub async fn submit<R: Relay + ?Sized>(&mut self, relay: &R) -> &SubmissionState {
        if let SubmitAttempt::Ready(pending) = self.begin_submit() {
            let result = relay.send(&pending.message).await;
            self.finish(pending, result);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Relay that records calls and answers with a fixed status
    struct FakeRelay {
        calls: AtomicUsize,
        last: Mutex<Option<RelayMessage>>,
        status: Option<u16>,
    }

    impl FakeRelay {
        fn answering(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                status: Some(status),
            }
        }

        fn unconfigured() -> Self {
            Self {
                status: None,
                ..Self::answering(200)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Relay for FakeRelay {
        async fn send(&self, message: &RelayMessage) -> Result<(), RelayError> {
            let status = self.status.ok_or(RelayError::NotConfigured)?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(message.clone());
            let status = StatusCode::from_u16(status).unwrap();
            if status.is_success() {
                Ok(())
            } else {
                Err(RelayError::Rejected { status })
            }
        }
    }

    fn filled() -> ContactForm {
        let mut form = ContactForm::default();
        form.edit(Field::Name, "Ada Lovelace");
        form.edit(Field::Email, "ada@example.com");
        form.edit(Field::Message, "I would love to collaborate.");
        form
    }

    #[tokio::test]
    async fn test_success_resets_fields() {
        let relay = FakeRelay::answering(200);
        let mut form = filled();

        assert_eq!(form.submit(&relay).await, &SubmissionState::Succeeded);
        assert_eq!(relay.calls(), 1);
        assert_eq!(form.fields(), &ContactFields::default());

        let sent = relay.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.name, "Ada Lovelace");
        assert_eq!(sent.from_name, DEFAULT_FROM_NAME);
        assert_eq!(sent.subject, "New Contact Form Submission from Ada Lovelace");
    }

    #[tokio::test]
    async fn test_server_error_keeps_fields() {
        let relay = FakeRelay::answering(500);
        let mut form = filled();
        let before = form.fields().clone();

        match form.submit(&relay).await {
            SubmissionState::Failed(message) => assert!(!message.is_empty()),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(form.fields(), &before);
    }

    #[tokio::test]
    async fn test_honeypot_never_calls_relay() {
        let relay = FakeRelay::answering(200);
        let mut form = filled();
        form.edit(Field::Honeypot, "http://spam.example");

        assert_eq!(form.submit(&relay).await, &SubmissionState::Idle);
        assert_eq!(relay.calls(), 0);
        assert!(form.errors().is_empty());

        let mut invalid = ContactForm::default();
        invalid.edit(Field::Honeypot, "x");
        assert!(matches!(invalid.begin_submit(), SubmitAttempt::Ignored));
        assert!(invalid.errors().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_fields_block_submission() {
        let relay = FakeRelay::answering(200);
        let mut form = ContactForm::default();
        form.edit(Field::Name, "A");
        form.edit(Field::Email, "a@b");

        assert_eq!(form.submit(&relay).await, &SubmissionState::Idle);
        assert_eq!(relay.calls(), 0);
        let fields: Vec<_> = form.errors().keys().copied().collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Message]);

        form.edit(Field::Name, "Al");
        assert!(!form.errors().contains_key(&Field::Name));
        assert!(form.errors().contains_key(&Field::Email));
    }

    #[tokio::test]
    async fn test_missing_credential_explains_alternative() {
        let relay = FakeRelay::unconfigured();
        let mut form = filled();
        match form.submit(&relay).await {
            SubmissionState::Failed(message) => {
                assert!(message.contains("contact me directly via email"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_single_outstanding_submission() {
        let mut form = filled();
        let SubmitAttempt::Ready(pending) = form.begin_submit() else {
            panic!("expected ready");
        };
        assert!(!form.can_submit());
        assert!(matches!(form.begin_submit(), SubmitAttempt::Busy));

        assert!(form.finish(pending, Ok(())));
        assert!(form.can_submit());
        assert_eq!(form.state(), &SubmissionState::Succeeded);
    }

    #[test]
    fn test_late_response_after_reset_is_dropped() {
        let mut form = filled();
        let SubmitAttempt::Ready(pending) = form.begin_submit() else {
            panic!("expected ready");
        };
        form.reset();
        form.edit(Field::Name, "Someone else");

        assert!(!form.finish(pending, Ok(())));
        assert_eq!(form.state(), &SubmissionState::Idle);
        assert_eq!(form.fields().name, "Someone else");
    }

    #[test]
    fn test_edit_dismisses_failure() {
        let mut form = filled();
        let SubmitAttempt::Ready(pending) = form.begin_submit() else {
            panic!("expected ready");
        };
        form.finish(pending, Err(RelayError::NotConfigured));
        assert!(matches!(form.state(), SubmissionState::Failed(_)));

        form.edit(Field::Message, "Trying once more, with feeling.");
        assert_eq!(form.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_success_does_not_revert() {
        let mut form = filled();
        let SubmitAttempt::Ready(pending) = form.begin_submit() else {
            panic!("expected ready");
        };
        form.finish(pending, Ok(()));
        form.edit(Field::Name, "New");
        assert_eq!(form.state(), &SubmissionState::Succeeded);
    }

    #[test]
    fn test_state_serializes_for_clients() {
        let failed = SubmissionState::Failed("nope".into());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"state": "failed", "error": "nope"})
        );
        assert_eq!(
            serde_json::to_value(&SubmissionState::Succeeded).unwrap(),
            serde_json::json!({"state": "succeeded"})
        );
    }
}
