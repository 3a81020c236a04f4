//! Data models: email categories, form aggregates, pagination.

pub mod category;
pub mod form;
pub mod pagination;

pub use category::*;
pub use form::*;
pub use pagination::*;
