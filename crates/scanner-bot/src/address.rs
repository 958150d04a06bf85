//! Solana token address validation.

use std::sync::OnceLock;

use regex::Regex;

static BASE58: OnceLock<Regex> = OnceLock::new();

/// Basic Solana address check: base58 alphabet (no `0`, `O`, `I`, `l`),
/// 32–44 characters. Anything else is rejected before the API is asked.
pub fn is_valid_token_address(address: &str) -> bool {
    if address.len() < 32 || address.len() > 44 {
        return false;
    }
    let pattern = BASE58.get_or_init(|| {
        Regex::new("^[1-9A-HJ-NP-Za-km-z]+$").expect("base58 pattern is valid")
    });
    pattern.is_match(address)
}
