//! Request middleware.

pub mod auth;

pub use auth::{AuthUser, DemoIdentity, IdentityProvider, auth_middleware};
