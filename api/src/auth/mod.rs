//! Authentication
//!
//! Bearer-token middleware for user, optional and admin routes.

mod token;

pub use token::{auth_middleware, optional_auth_middleware, require_admin};
