//! Authentication for doorgate
//!
//! - Argon2id password hashing with constant-time verification
//! - HS256 bearer tokens with a fixed validity window
//! - The gate that turns an `Authorization` header into an identity

pub mod gate;
pub mod password;
pub mod token;

pub use gate::*;
pub use password::*;
pub use token::*;
