use std::collections::HashSet;
use crate::models::Poll;

pub const MAX_ID_LENGTH: usize = 64;
pub const MAX_QUESTION_LENGTH: usize = 300;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_OPTIONS: usize = 32;
pub const MIN_OPTIONS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Poll id must not be empty")]
    EmptyId,
    #[error("Poll id exceeds maximum length of {MAX_ID_LENGTH}")]
    IdTooLong,
    #[error("Poll id must not contain whitespace, control characters or '/'")]
    MalformedId,
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("Question exceeds maximum length of {MAX_QUESTION_LENGTH}")]
    QuestionTooLong,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Empty option text")]
    EmptyOption,
    #[error("Option text exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
}

pub fn validate_poll_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() { return Err(ValidationError::EmptyId); }
    if id.chars().count() > MAX_ID_LENGTH { return Err(ValidationError::IdTooLong); }
    if id.chars().any(|c| c.is_whitespace() || c.is_control() || c == '/') { return Err(ValidationError::MalformedId); }
    Ok(())
}

pub fn validate_poll(poll: &Poll) -> Result<(), ValidationError> {
    validate_poll_id(&poll.id)?;

    if poll.question.trim().is_empty() { return Err(ValidationError::EmptyQuestion); }
    if poll.question.chars().count() > MAX_QUESTION_LENGTH { return Err(ValidationError::QuestionTooLong); }
    if poll.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }
    if poll.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }
    if poll.options.iter().any(|opt| opt.trim().is_empty()) { return Err(ValidationError::EmptyOption); }
    if poll.options.iter().any(|opt| opt.chars().count() > MAX_OPTION_LENGTH) { return Err(ValidationError::OptionTooLong); }

    let mut seen = HashSet::with_capacity(poll.options.len());
    if let Some(dup) = poll.options.iter().find(|opt| !seen.insert(opt.as_str())) {
        return Err(ValidationError::DuplicateOption(dup.clone()));
    }

    Ok(())
}
