//! HTTP request handlers.

pub mod categories;
pub mod extract;
pub mod forms;
pub mod http;

pub use categories::*;
pub use forms::*;
pub use http::*;
