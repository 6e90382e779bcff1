//! Core types and authentication logic for doorgate

pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::*;
pub use config::*;
pub use error::*;
pub use service::*;
pub use store::*;
pub use types::*;

/// Result type alias for doorgate operations
pub type Result<T> = std::result::Result<T, DoorgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_action_parsing() {
        assert_eq!(DoorAction::from_query_value("1").unwrap(), DoorAction::Open);
        assert_eq!(DoorAction::from_query_value("2").unwrap(), DoorAction::Close);

        for bad in ["", "0", "3", "9", "abc", "1.5", " 1", "01"] {
            let err = DoorAction::from_query_value(bad).unwrap_err();
            assert!(matches!(
                err,
                DoorgateError::Validation(ValidationError::InvalidDoorParameter)
            ));
        }
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("alice01", "Secret1");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("alice01"));
        assert!(!printed.contains("Secret1"));
    }

    #[test]
    fn test_user_record_serialization() {
        let record = UserRecord::new("alice01", "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$ZGlnZXN0");
        let json = serde_json::to_vec(&record).unwrap();
        let decoded: UserRecord = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
