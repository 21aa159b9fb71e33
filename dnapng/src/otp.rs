//! One-time pad over base sequences.
//!
//! Plaintext bytes are packed with [`BaseOrder::Atcg`] and combined base by
//! base with a key sequence by XOR of their 2-bit values. Key material is
//! supplied by the caller.

use crate::pack::{pack_bytes, parse_base, unpack_bases, BaseOrder, PackError};

const ORDER: BaseOrder = BaseOrder::Atcg;

/// XOR two equal-length sequences base by base.
pub fn xor_sequences(left: &str, right: &str) -> Result<String, PackError> {
    let l = left.chars().count();
    let r = right.chars().count();
    if l != r {
        return Err(PackError::LengthMismatch { left: l, right: r });
    }
    left.chars()
        .zip(right.chars())
        .enumerate()
        .map(|(position, (a, b))| {
            let a = ORDER.bits(parse_base(a, position)?);
            let b = ORDER.bits(parse_base(b, position)?);
            Ok(ORDER.base(a ^ b).as_char())
        })
        .collect()
}

/// Encrypt `plaintext` with the leading bases of `key`.
pub fn encrypt(plaintext: &[u8], key: &str) -> Result<String, PackError> {
    let message = pack_bytes(plaintext, ORDER);
    let key = key.trim();
    let available = key.chars().count();
    if available < message.len() {
        return Err(PackError::KeyTooShort {
            needed: message.len(),
            available,
        });
    }
    let key: String = key.chars().take(message.len()).collect();
    xor_sequences(&message, &key)
}

/// Decrypt a ciphertext sequence. The key must be exactly as long as the
/// ciphertext.
pub fn decrypt(ciphertext: &str, key: &str) -> Result<Vec<u8>, PackError> {
    let message = xor_sequences(ciphertext.trim(), key.trim())?;
    unpack_bases(&message, ORDER)
}
