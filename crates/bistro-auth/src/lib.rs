//! Shared trust model for every Bistro service: password hashing, token
//! issuance and validation, and the request gate built on top of them.

pub mod config;
pub mod gate;
pub mod password;
pub mod token;

pub use config::{AuthConfig, ConfigError};
pub use gate::{AuthRejection, Gate, authorize};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Capability, Principal, TokenError, TokenIssuer, TokenValidator};
