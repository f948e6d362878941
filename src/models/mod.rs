pub mod enums;
pub mod scraped;
pub mod template;

pub use enums::*;
pub use scraped::*;
pub use template::*;

use thiserror::Error;

/// A string that does not name any variant of a fixed vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}
