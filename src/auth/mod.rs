/// Authentication module
///
/// Password hashing, JWT issuance/validation and the admin
/// registration/login service built on top of them.

mod claims;
mod jwt;
mod password;
mod service;

pub use claims::{AdminRecord, Claims, Identity, Role};
pub use jwt::TokenIssuer;
pub use password::CredentialHasher;
pub use service::{AccessToken, AdminAuthService, TOKEN_TYPE};
