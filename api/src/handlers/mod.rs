//! Translation of domain failures into HTTP responses

pub mod error;

pub use error::{json_error_handler, ApiError};
