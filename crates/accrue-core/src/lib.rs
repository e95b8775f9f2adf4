pub mod constants;
pub mod error;
pub mod interfaces;
pub mod records;
pub mod types;

pub use constants::*;
pub use error::AccrueError;
pub use interfaces::*;
pub use records::*;
pub use types::*;
