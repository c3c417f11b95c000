pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result, ValidationError};
pub use types::*;
