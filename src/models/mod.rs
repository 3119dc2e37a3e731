pub mod book;
pub mod entity;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Sorry, same {0} already exists")]
    Duplicate(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Trims `value` and checks it is non-blank and at most `max_len` characters.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String, ModelError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ModelError::Invalid(format!("{} must not be blank", field)));
    }
    if value.chars().count() > max_len {
        return Err(ModelError::Invalid(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}
