//! Contact form: validation, submission state and the email relay

mod form;
mod relay;
pub mod validation;

pub use form::{
    ContactFields, ContactForm, Field, FieldErrors, PendingSubmission, SubmissionState,
    SubmitAttempt, DEFAULT_FROM_NAME,
};
pub use relay::{Relay, RelayError, RelayMessage, Web3FormsRelay};
