use crate::models::ModelError;

pub mod books;
pub mod entities;
pub mod home;

pub const SUBMISSION_SUCCESSFUL: &str = "Form submission successful";
pub const UPDATE_SUCCESSFUL: &str = "Update submission successful";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Success,
    Error,
}

/// One-shot notice shown above a form after it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Message {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.level {
            MessageLevel::Success => "message success",
            MessageLevel::Error => "message error",
        }
    }
}

/// Turns user-correctable failures into an error message and lets the rest propagate.
pub fn outcome_message<T>(result: Result<T, ModelError>, success: &str) -> Result<Message, ModelError> {
    match result {
        Ok(_) => Ok(Message::success(success)),
        Err(e @ (ModelError::Duplicate(_) | ModelError::Invalid(_))) => Ok(Message::error(e.to_string())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_message_keeps_database_errors() {
        let ok = outcome_message(Ok::<_, ModelError>(()), SUBMISSION_SUCCESSFUL).unwrap();
        assert_eq!(ok, Message::success("Form submission successful"));

        let dup = outcome_message::<()>(Err(ModelError::Duplicate("category")), SUBMISSION_SUCCESSFUL)
            .unwrap();
        assert_eq!(dup.level, MessageLevel::Error);
        assert_eq!(dup.text, "Sorry, same category already exists");

        let missing = outcome_message::<()>(Err(ModelError::NotFound("author")), UPDATE_SUCCESSFUL);
        assert!(missing.is_err());
    }
}
