//! HTTP adapters - REST API over axum.
//!
//! Each area has its own dto/handlers/routes trio; [`router::build_app`]
//! stitches them together with auth and the tower-http layers.

pub mod error;
pub mod middleware;
pub mod orders;
pub mod payments;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{api_routes, build_app, HttpSettings};
pub use state::AppState;
