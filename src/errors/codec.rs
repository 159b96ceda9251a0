use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Only non-negative ids have a token representation
    #[error("Invalid input: cannot encode negative id {0}")]
    NegativeId(i64),

    /// A token carries at least one symbol
    #[error("Invalid input: token is empty")]
    EmptyToken,

    /// The token contains a character outside the base62 alphabet
    #[error("Invalid input: symbol '{symbol}' at index {index} is not a base62 digit")]
    InvalidSymbol { symbol: char, index: usize },

    /// The decoded value does not fit a signed 64-bit id
    #[error("Invalid input: token '{0}' exceeds the 64-bit id range")]
    Overflow(String),
}
