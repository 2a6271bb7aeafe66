// Difficulty interpretation

use crate::core::TemplateError;

/// Hex digits in ascending order; fractional difficulty keeps a prefix of this set
pub const HEX_CHARSET: &str = "0123456789abcdef";

/// Difficulty target representation
///
/// The integer part of the difficulty is how many characters of the previous
/// block hash the new hash must repeat as its prefix. A non-zero fractional
/// part further restricts the character right after that prefix to the first
/// `ceil(16 * (1 - frac))` hex digits.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTarget {
    /// Difficulty as reported by the node
    pub difficulty: f64,
    /// Integer part: length of the required hash prefix
    pub prefix_len: usize,
    /// Characters allowed right after the prefix
    pub charset: &'static str,
    /// True iff the difficulty has a non-zero fractional part
    pub has_fraction: bool,
}

impl DifficultyTarget {
    /// Derive the target from a node difficulty. Negative or NaN input is
    /// treated as zero.
    pub fn from_difficulty(difficulty: f64) -> Self {
        let difficulty = if difficulty.is_finite() && difficulty > 0.0 { difficulty } else { 0.0 };
        let whole = difficulty.floor();
        let fraction = difficulty - whole;

        let (charset, has_fraction) = if fraction > 0.0 {
            let count = (16.0 * (1.0 - fraction)).ceil().clamp(1.0, 16.0) as usize;
            (&HEX_CHARSET[..count], true)
        } else {
            (HEX_CHARSET, false)
        };

        Self {
            difficulty,
            prefix_len: whole as usize,
            charset,
            has_fraction,
        }
    }

    /// The trailing `prefix_len` characters of the previous block hash,
    /// which the new block hash must start with.
    pub fn chunk<'a>(&self, previous_hash: &'a str) -> Result<&'a str, TemplateError> {
        let available = previous_hash.len();
        if self.prefix_len > available {
            return Err(TemplateError::PrefixTooLong {
                required: self.prefix_len,
                available,
            });
        }
        previous_hash
            .get(available - self.prefix_len..)
            .ok_or_else(|| TemplateError::InvalidHex {
                field: "previous hash",
                reason: "not ASCII".to_string(),
            })
    }
}
