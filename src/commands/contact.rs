//! Send a contact message from the terminal

use anyhow::Result;

use crate::contact::{
    ContactFields, ContactForm, Relay, SubmissionState, SubmitAttempt, Web3FormsRelay,
};
use crate::Folio;

/// Validate and relay one message with the site's contact settings
pub async fn run(folio: &Folio, fields: ContactFields) -> Result<()> {
    let relay = Web3FormsRelay::from_config(&folio.config.contact);
    send(folio, fields, &relay).await
}

/// Same as [`run`] with an explicit relay
pub async fn send<R: Relay + ?Sized>(folio: &Folio, fields: ContactFields, relay: &R) -> Result<()> {
    let mut form = ContactForm::with_fields(folio.config.contact.from_name.clone(), fields);

    let pending = match form.begin_submit() {
        SubmitAttempt::Ready(pending) => pending,
        SubmitAttempt::Invalid(errors) => {
            for (field, message) in &errors {
                eprintln!("  {}: {}", field, message);
            }
            anyhow::bail!("Message not sent: {} invalid field(s)", errors.len());
        }
        SubmitAttempt::Ignored | SubmitAttempt::Busy => return Ok(()),
    };

    tracing::info!("Sending message from {}", pending.message.email);
    let result = relay.send(&pending.message).await;
    form.finish(pending, result);

    match form.state() {
        SubmissionState::Succeeded => {
            println!("Message sent. Thanks for reaching out!");
            Ok(())
        }
        SubmissionState::Failed(message) => anyhow::bail!("{}", message),
        other => anyhow::bail!("Unexpected submission state: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fields() -> ContactFields {
        ContactFields {
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            message: "Let's talk about compilers.".to_string(),
            honeypot: String::new(),
        }
    }

    #[tokio::test]
    async fn test_send_through_relay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let relay = Web3FormsRelay::new(format!("{}/submit", server.uri()), Some("key".into()));

        send(&folio, fields(), &relay).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_fields_are_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let relay = Web3FormsRelay::new(format!("{}/submit", server.uri()), Some("key".into()));

        let mut bad = fields();
        bad.email = "not-an-email".to_string();
        assert!(send(&folio, bad, &relay).await.is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_relay_fails() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let relay = Web3FormsRelay::new("http://127.0.0.1:9/submit", None);

        let err = send(&folio, fields(), &relay).await.unwrap_err();
        assert!(err.to_string().contains("contact me directly via email"));
    }
}
