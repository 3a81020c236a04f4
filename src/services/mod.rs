//! Business logic: email categories and the form builder.

pub mod category;
pub mod form;

pub use category::CategoryService;
pub use form::FormService;
