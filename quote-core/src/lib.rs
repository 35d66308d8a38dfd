pub mod models;
pub mod resolver;
pub mod validation;

pub use models::*;
pub use resolver::resolve;
pub use validation::{ValidationError, validate};
