//! Authentication and access control
//!
//! - [`JwtService`] - token issue and validation
//! - [`Principal`] - the caller of a request
//! - [`authenticate`] - reads bearer tokens into the request
//! - [`gate`] - admin / manager / self checks, failing with a sign-in redirect

pub mod extractor;
pub mod gate;
pub mod jwt;
pub mod middleware;

pub use gate::GateRejection;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, Principal};
pub use middleware::{authenticate, require_admin, require_manager_or_admin, require_signed_in};
