/// Opaque token generation
///
/// Session and magic-link tokens are 16 bytes from the operating system's
/// CSPRNG, hex-encoded to 32 lowercase characters. They carry no payload.
///
/// Uniqueness is probabilistic (2^128 space). The token columns carry a
/// `UNIQUE` constraint, so a collision surfaces as a storage error rather
/// than two rows sharing a credential.
///
/// # Example
///
/// ```
/// use tally_shared::auth::token::{new_token, TOKEN_LENGTH};
///
/// let token = new_token();
/// assert_eq!(token.len(), TOKEN_LENGTH);
/// assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
/// ```

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 16;

/// Length of a hex-encoded token (characters)
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Generates a new opaque token
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Checks that a string has the shape of a token
///
/// Lets callers reject garbage before it reaches the database.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_token_format() {
        let token = new_token();
        assert_eq!(token.len(), 32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_new_token_uniqueness() {
        let tokens: HashSet<String> = (0..1000).map(|_| new_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(&new_token()));
        assert!(is_well_formed("0123456789abcdef0123456789ABCDEF"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc"));
        assert!(!is_well_formed("zz23456789abcdef0123456789abcdef"));
        assert!(!is_well_formed("0123456789abcdef0123456789abcdef0"));
    }
}
