//! Authentication: register, login, JWT.

mod jwt;
mod handlers;
mod service;

pub use handlers::{login, me, register};
pub use jwt::{Claims, JwtSecret};
pub use service::AuthAppService;
