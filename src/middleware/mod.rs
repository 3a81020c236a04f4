//! Middleware: bearer-token authentication shared by the protected routes.

pub mod auth;

pub use auth::AuthUser;
