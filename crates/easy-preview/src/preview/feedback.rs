// Feedback - Validated feedback submission to a remote backend
//
// Submission is asynchronous and may fail; it never reads or writes preview
// or resize state.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Feedback category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    #[default]
    Query,
    Request,
    Collaboration,
    Bug,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 4] = [
        FeedbackCategory::Query,
        FeedbackCategory::Request,
        FeedbackCategory::Collaboration,
        FeedbackCategory::Bug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Query => "query",
            FeedbackCategory::Request => "request",
            FeedbackCategory::Collaboration => "collaboration",
            FeedbackCategory::Bug => "bug",
        }
    }

    /// Display name in the category selector.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackCategory::Query => "General Query",
            FeedbackCategory::Request => "Feature Request",
            FeedbackCategory::Collaboration => "Collaboration",
            FeedbackCategory::Bug => "Bug Report",
        }
    }

    /// Placeholder of the message field for this category.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FeedbackCategory::Query => "Ask us anything or share your thoughts...",
            FeedbackCategory::Request => "Describe the feature you'd like to see...",
            FeedbackCategory::Collaboration => "Tell us how you'd like to contribute...",
            FeedbackCategory::Bug => "Describe what's not working correctly...",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FeedbackCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown feedback category '{}'", s)))
    }
}

/// Raw feedback form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    /// Star rating, 0 when none was selected
    pub rating: u8,
    pub category: Option<FeedbackCategory>,
    pub message: String,
}

/// Feedback that passed validation, as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    pub name: String,
    pub email: String,
    pub rating: u8,
    pub category: FeedbackCategory,
    pub message: String,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should compile")
    })
}

impl FeedbackForm {
    /// Validates the form, collecting every problem in form order.
    pub fn validate(&self) -> Result<FeedbackSubmission> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() {
            errors.push("Full Name is required".to_string());
        }
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !email_pattern().is_match(email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if !(1..=5).contains(&self.rating) {
            errors.push("Please select a rating".to_string());
        }
        if self.category.is_none() {
            errors.push("Please select a category".to_string());
        }
        if message.is_empty() {
            errors.push("Message is required".to_string());
        }

        match (errors.is_empty(), self.category) {
            (true, Some(category)) => Ok(FeedbackSubmission {
                name: name.to_string(),
                email: email.to_string(),
                rating: self.rating,
                category,
                message: message.to_string(),
            }),
            _ => Err(Error::InvalidFeedback(errors)),
        }
    }
}

/// Remote collaborator that stores feedback.
#[async_trait]
pub trait FeedbackBackend: Send + Sync {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<()>;
}

/// Validates and submits a feedback form.
///
/// Backend failures are logged and returned; the caller keeps the form open
/// so the user can retry.
pub async fn submit_feedback(backend: &dyn FeedbackBackend, form: &FeedbackForm) -> Result<()> {
    let submission = form.validate()?;
    match backend.submit(&submission).await {
        Ok(()) => {
            tracing::debug!("Feedback submitted ({})", submission.category);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Feedback submission failed: {}", e);
            Err(e.context("submitting feedback"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn valid_form() -> FeedbackForm {
        FeedbackForm {
            name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            rating: 4,
            category: Some(FeedbackCategory::Request),
            message: "Add a landscape toggle shortcut".to_string(),
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        received: Mutex<Vec<FeedbackSubmission>>,
        fail: bool,
    }

    #[async_trait]
    impl FeedbackBackend for RecordingBackend {
        async fn submit(&self, submission: &FeedbackSubmission) -> Result<()> {
            if self.fail {
                return Err(Error::Backend("503 Service Unavailable".to_string()));
            }
            self.received.lock().push(submission.clone());
            Ok(())
        }
    }

    #[test]
    fn test_validate_trims() {
        let submission = valid_form().validate().unwrap();
        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.category, FeedbackCategory::Request);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let form = FeedbackForm {
            email: "not-an-email".to_string(),
            ..FeedbackForm::default()
        };
        match form.validate() {
            Err(Error::InvalidFeedback(errors)) => assert_eq!(
                errors,
                vec![
                    "Full Name is required",
                    "Please enter a valid email address",
                    "Please select a rating",
                    "Please select a category",
                    "Message is required",
                ]
            ),
            other => panic!("expected InvalidFeedback, got {:?}", other),
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("bug".parse::<FeedbackCategory>().unwrap(), FeedbackCategory::Bug);
        assert!("praise".parse::<FeedbackCategory>().is_err());
        assert_eq!(FeedbackCategory::Bug.label(), "Bug Report");
    }

    #[tokio::test]
    async fn test_submit_feedback_success() {
        let backend = RecordingBackend::default();
        submit_feedback(&backend, &valid_form()).await.unwrap();
        assert_eq!(backend.received.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_feedback_invalid_never_reaches_backend() {
        let backend = RecordingBackend::default();
        let err = submit_feedback(&backend, &FeedbackForm::default())
            .await
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(backend.received.lock().is_empty());
    }

    #[tokio::test]
    async fn test_submit_feedback_backend_failure() {
        let backend = RecordingBackend {
            fail: true,
            ..RecordingBackend::default()
        };
        let err = submit_feedback(&backend, &valid_form()).await.unwrap_err();
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("503"));
    }
}
