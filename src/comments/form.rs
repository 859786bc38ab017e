//! Comment form state, validation and submission

use serde::{Deserialize, Serialize};

use super::intake::CommentIntake;

/// A required form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[serde(rename = "_id")]
    Post,
    Name,
    Email,
    Comment,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Post => "_id",
            Field::Name => "name",
            Field::Email => "email",
            Field::Comment => "comment",
        }
    }

    fn required_message(&self) -> &'static str {
        match self {
            Field::Post => "The post reference is required",
            Field::Name => "The name field is required",
            Field::Email => "The email field is required",
            Field::Comment => "The comment field is required",
        }
    }
}

/// A field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn required(field: Field) -> Self {
        Self {
            field,
            message: field.required_message(),
        }
    }
}

/// What the reader typed into the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentDraft {
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

/// Validated payload sent to the moderation intake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSubmission {
    #[serde(rename = "_id")]
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
}

impl CommentDraft {
    /// Check the required fields. Every empty field is reported, in form order.
    pub fn validate(&self) -> Result<CommentSubmission, Vec<FieldError>> {
        let errors: Vec<FieldError> = [
            (Field::Post, &self.post_id),
            (Field::Name, &self.name),
            (Field::Email, &self.email),
            (Field::Comment, &self.comment),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldError::required(field))
        .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CommentSubmission {
            post_id: self.post_id.clone(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            comment: self.comment.trim().to_string(),
        })
    }
}

/// Form view state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    /// Form visible and editable
    Idle,
    /// Thank-you message visible, form hidden
    Submitted,
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ok,
    TransportError(String),
    ValidationError(Vec<FieldError>),
}

/// The comment form of one page render. Built fresh per request; nothing is
/// shared between pages or readers.
#[derive(Debug, Clone)]
pub struct CommentForm {
    post_id: String,
    state: FormState,
    draft: CommentDraft,
    errors: Vec<FieldError>,
    transport_error: Option<String>,
}

impl CommentForm {
    /// A fresh, idle form bound to a post
    pub fn new(post_id: impl Into<String>) -> Self {
        let post_id = post_id.into();
        Self {
            draft: CommentDraft {
                post_id: post_id.clone(),
                ..Default::default()
            },
            post_id,
            state: FormState::Idle,
            errors: Vec::new(),
            transport_error: None,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    /// Validate and send `draft`. Only a successful intake call moves the form
    /// to `Submitted`; any failure leaves it `Idle` with the draft kept.
    ///
    /// Taking `&mut self` means a form can only have one submission in flight.
    pub async fn submit<I>(&mut self, mut draft: CommentDraft, intake: &I) -> SubmitOutcome
    where
        I: CommentIntake + ?Sized,
    {
        if self.state == FormState::Submitted {
            return SubmitOutcome::Ok;
        }

        // The hidden `_id` field is not trusted; the form is bound to its post.
        draft.post_id = self.post_id.clone();
        self.errors.clear();
        self.transport_error = None;

        let submission = match draft.validate() {
            Ok(submission) => submission,
            Err(errors) => {
                tracing::debug!(
                    "Comment for {} failed validation: {:?}",
                    self.post_id,
                    errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>()
                );
                self.draft = draft;
                self.errors = errors.clone();
                return SubmitOutcome::ValidationError(errors);
            }
        };

        match intake.submit(&submission).await {
            Ok(()) => {
                tracing::info!("Comment submitted for post {}", self.post_id);
                self.state = FormState::Submitted;
                self.draft = CommentDraft {
                    post_id: self.post_id.clone(),
                    ..Default::default()
                };
                SubmitOutcome::Ok
            }
            Err(e) => {
                tracing::warn!("Comment submission for post {} failed: {}", self.post_id, e);
                let message = e.to_string();
                self.draft = draft;
                self.transport_error = Some(message.clone());
                SubmitOutcome::TransportError(message)
            }
        }
    }

    /// Template data for this form
    pub fn view(&self) -> FormView {
        let has = |field: Field| self.errors.iter().any(|e| e.field == field);
        FormView {
            post_id: self.post_id.clone(),
            submitted: self.state == FormState::Submitted,
            name: self.draft.name.clone(),
            email: self.draft.email.clone(),
            comment: self.draft.comment.clone(),
            name_error: has(Field::Name),
            email_error: has(Field::Email),
            comment_error: has(Field::Comment),
            messages: self.errors.iter().map(|e| e.message).collect(),
            retry: self.transport_error.is_some(),
        }
    }
}

/// Serializable form view for templates
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub post_id: String,
    pub submitted: bool,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub name_error: bool,
    pub email_error: bool,
    pub comment_error: bool,
    pub messages: Vec<&'static str>,
    pub retry: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::intake::IntakeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records submissions; fails while `fail` is set
    #[derive(Default)]
    struct RecordingIntake {
        sent: Mutex<Vec<CommentSubmission>>,
        fail: bool,
    }

    #[async_trait]
    impl CommentIntake for RecordingIntake {
        async fn submit(&self, comment: &CommentSubmission) -> Result<(), IntakeError> {
            if self.fail {
                return Err(IntakeError::Transport("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(comment.clone());
            Ok(())
        }
    }

    fn draft(name: &str, email: &str, comment: &str) -> CommentDraft {
        CommentDraft {
            post_id: "post-1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_validate_reports_each_empty_field() {
        let errors = draft("", "", "Great read").validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Email]);
        assert_eq!(errors[0].message, "The name field is required");

        let errors = draft("Ann", "ann@example.com", "   ").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Comment);

        assert_eq!(draft("", "", "").validate().unwrap_err().len(), 3);
    }

    #[test]
    fn test_validate_requires_post_reference() {
        let mut unbound = draft("Ann", "ann@example.com", "Hi");
        unbound.post_id = "  ".to_string();
        let errors = unbound.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Post);
        assert_eq!(errors[0].message, "The post reference is required");
        assert_eq!(
            serde_json::to_value(&errors[0]).unwrap()["field"],
            serde_json::json!("_id")
        );
    }

    #[test]
    fn test_validate_trims_payload() {
        let submission = draft(" Ann ", "ann@example.com", " Hi\n").validate().unwrap();
        assert_eq!(submission.name, "Ann");
        assert_eq!(submission.comment, "Hi");
        assert_eq!(submission.post_id, "post-1");
    }

    #[test]
    fn test_submission_wire_format() {
        let submission = draft("Ann", "ann@example.com", "Hi").validate().unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "_id": "post-1",
                "name": "Ann",
                "email": "ann@example.com",
                "comment": "Hi"
            })
        );
    }

    #[tokio::test]
    async fn test_successful_submit_transitions_once() {
        let intake = RecordingIntake::default();
        let mut form = CommentForm::new("post-1");
        assert_eq!(form.state(), FormState::Idle);

        let outcome = form
            .submit(draft("Ann", "ann@example.com", "Hi"), &intake)
            .await;
        assert_eq!(outcome, SubmitOutcome::Ok);
        assert_eq!(form.state(), FormState::Submitted);
        assert!(form.view().submitted);

        // A second submit on a submitted form does not reach the intake
        let outcome = form
            .submit(draft("Ann", "ann@example.com", "Hi again"), &intake)
            .await;
        assert_eq!(outcome, SubmitOutcome::Ok);
        assert_eq!(intake.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submit_stays_idle() {
        let intake = RecordingIntake::default();
        let mut form = CommentForm::new("post-1");

        let outcome = form.submit(draft("", "", "Hello"), &intake).await;
        match outcome {
            SubmitOutcome::ValidationError(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec![Field::Name, Field::Email]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(form.state(), FormState::Idle);
        assert!(intake.sent.lock().unwrap().is_empty());

        let view = form.view();
        assert!(view.name_error && view.email_error && !view.comment_error);
        assert_eq!(view.comment, "Hello");
        assert_eq!(view.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_offers_retry() {
        let intake = RecordingIntake {
            fail: true,
            ..Default::default()
        };
        let mut form = CommentForm::new("post-1");

        let outcome = form
            .submit(draft("Ann", "ann@example.com", "Hi"), &intake)
            .await;
        assert!(matches!(outcome, SubmitOutcome::TransportError(_)));
        assert_eq!(form.state(), FormState::Idle);
        assert!(form.transport_error().is_some());

        let view = form.view();
        assert!(view.retry);
        assert!(!view.submitted);
        assert_eq!(view.name, "Ann");
    }

    #[tokio::test]
    async fn test_form_binds_post_id() {
        let intake = RecordingIntake::default();
        let mut form = CommentForm::new("post-1");
        let mut tampered = draft("Ann", "ann@example.com", "Hi");
        tampered.post_id = "post-2".to_string();

        form.submit(tampered, &intake).await;
        assert_eq!(intake.sent.lock().unwrap()[0].post_id, "post-1");
    }
}
