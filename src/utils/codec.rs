//! Base62 codec for public short ids.
//!
//! Tokens are the little-endian base62 digits of the id: the first symbol is
//! the least significant digit. `62` therefore encodes as `"01"`, not `"10"`.
//! Issued tokens depend on this order, so it must never be flipped.

use log::trace;

use crate::errors::CodecError;

/// Digits of the numeral system, indexed by value
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const BASE: u64 = 62;

/// Length of the token for `i64::MAX`
pub const MAX_TOKEN_LEN: usize = 11;

type Result<T> = std::result::Result<T, CodecError>;

/// Encodes a non-negative id into its base62 token (least significant digit first)
pub fn encode(id: i64) -> Result<String> {
    let mut number = u64::try_from(id).map_err(|_| CodecError::NegativeId(id))?;

    if number == 0 {
        return Ok(char::from(ALPHABET[0]).to_string());
    }

    let mut token = String::with_capacity(MAX_TOKEN_LEN);
    while number > 0 {
        token.push(char::from(ALPHABET[(number % BASE) as usize]));
        number /= BASE;
    }

    trace!("Encoded id {} as '{}'", id, token);
    Ok(token)
}

/// Decodes a token produced by [`encode`] back into its id
///
/// Trailing `0` symbols are leading zeros of the number and decode to the
/// same id as the token without them.
pub fn decode(token: &str) -> Result<i64> {
    if token.is_empty() {
        return Err(CodecError::EmptyToken);
    }

    // Horner's rule from the most significant (last) symbol.
    let mut id: i64 = 0;
    for (index, symbol) in token.char_indices().rev() {
        let digit = digit_value(symbol).ok_or(CodecError::InvalidSymbol { symbol, index })?;
        id = id
            .checked_mul(BASE as i64)
            .and_then(|shifted| shifted.checked_add(i64::from(digit)))
            .ok_or_else(|| CodecError::Overflow(token.to_string()))?;
    }

    trace!("Decoded '{}' as id {}", token, id);
    Ok(id)
}

/// Returns true when `token` is non-empty and uses only alphabet symbols
pub fn is_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| digit_value(c).is_some())
}

fn digit_value(symbol: char) -> Option<u8> {
    match symbol {
        '0'..='9' => Some(symbol as u8 - b'0'),
        'A'..='Z' => Some(symbol as u8 - b'A' + 10),
        'a'..='z' => Some(symbol as u8 - b'a' + 36),
        _ => None,
    }
}
