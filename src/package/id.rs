//! Package id generation
//!
//! Ids look like `1760781234567_k3x9q0zt2`: milliseconds since the Unix
//! epoch, an underscore, then nine base36 characters of OS randomness.
//! The randomness comes from a v4 UUID; if the OS source is unavailable
//! `uuid` panics, which takes the process down instead of handing out
//! predictable ids.

use chrono::Utc;
use uuid::Uuid;

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new package id
pub fn generate() -> String {
    format!("{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);

    for _ in 0..SUFFIX_LEN {
        suffix.push(ALPHABET[(bits % 36) as usize] as char);
        bits /= 36;
    }

    suffix
}
