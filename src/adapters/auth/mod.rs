//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 tokens issued by the auth service
//! - `mock` - Test implementation that doesn't require signed tokens

mod jwt;
mod mock;

pub use jwt::{AccessClaims, JwtConfig, JwtSessionValidator, ACCESS_TOKEN_TYPE};
pub use mock::MockSessionValidator;
