pub mod errors;
pub mod patch;

pub use errors::*;
pub use patch::*;
