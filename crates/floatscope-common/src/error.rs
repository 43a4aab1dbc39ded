use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloatscopeError {
    #[error("Invalid float date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Profile {0} has no depth samples")]
    EmptyProfile(String),
}

pub type Result<T> = std::result::Result<T, FloatscopeError>;
