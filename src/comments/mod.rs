//! Comment module - the reader comment form and moderation intake

mod form;
mod intake;

pub use form::{
    CommentDraft, CommentForm, CommentSubmission, Field, FieldError, FormState, FormView,
    SubmitOutcome,
};
pub use intake::{CommentIntake, HttpIntake, IntakeError};
