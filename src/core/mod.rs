// Core data structures: hashes and the block template

mod types;
mod hash;
mod template;

pub use types::*;
pub use hash::*;
pub use template::*;
