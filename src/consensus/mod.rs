// Difficulty interpretation and block validity

pub mod difficulty;
pub mod pow;

pub use difficulty::{DifficultyTarget, HEX_CHARSET};
pub use pow::{BlockValidator, check_block_is_valid, hash_meets_target};
