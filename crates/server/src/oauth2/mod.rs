//! OAuth2 password grant.
//!
//! ## Endpoints
//!
//! - `GET|POST /auth/token` - Password grant with client credentials
//! - `POST /auth/login` - Password grant under the service client
//! - `GET /auth/me` - Account behind the bearer token

pub mod bearer;
pub mod endpoints;
pub mod issuer;
pub mod password;
mod registrar;

pub use bearer::{Identity, authenticate};
pub use endpoints::router;
pub use issuer::{PasswordGrant, TokenIssuer, TokenResponse};
pub use password::{hash_password, verify_password};
pub use registrar::{ClientRegistry, RegistryError};

/// OpenAPI tag for authentication endpoints
pub const AUTH_TAG: &str = "Authentication";
