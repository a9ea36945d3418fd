//! Identifier generation

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::constants::BATTLE_ID_SUFFIX_LEN;

/// Generate a random lowercase alphanumeric token
pub fn generate_token(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Battle id: creation timestamp plus a random suffix
pub fn generate_battle_id(now: DateTime<Utc>) -> String {
    format!(
        "battle_{}_{}",
        now.timestamp_millis(),
        generate_token(BATTLE_ID_SUFFIX_LEN)
    )
}
