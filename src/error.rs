/// Error types for the chat stores.
/// Every store operation is all-or-nothing, so a failure leaves state untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Already friends")]
    AlreadyFriends,

    #[error("Friend request already sent")]
    RequestAlreadySent,

    #[error("Friend request not found")]
    RequestNotFound,

    #[error("Cannot send a friend request to yourself")]
    CannotBefriendSelf,

    #[error("Session error: {0}")]
    Session(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True for failures caused by the caller rather than by the server
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Session(_) | StoreError::Serialization(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StoreError::AlreadyFriends.to_string(), "Already friends");
        assert!(StoreError::UserNotFound("9".to_string())
            .to_string()
            .contains('9'));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(StoreError::NotAuthenticated.is_client_error());
        assert!(StoreError::RequestNotFound.is_client_error());
    }
}
