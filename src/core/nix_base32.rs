//! Nix-flavoured base32
//!
//! Uses the alphabet `0-9a-z` without `e`, `o`, `u` and `t`, and emits the
//! digest least-significant bit first, reading the string from the end. This
//! is the encoding used for store path digests and for `<algo>:<base32>`
//! hashes.

/// Encoding alphabet
const ALPHABET: &[u8; 32] = b"0123456789abcdfghijklmnpqrsvwxyz";

/// Length of the base32 encoding of `len` bytes
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (len * 8 - 1) / 5 + 1
    }
}

/// Encode bytes
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let len = encoded_len(bytes.len());
    let mut out = String::with_capacity(len);

    for n in (0..len).rev() {
        let b = n * 5;
        let i = b / 8;
        let j = b % 8;
        let low = u16::from(bytes[i]) >> j;
        let high = bytes
            .get(i + 1)
            .map_or(0, |next| u16::from(*next) << (8 - j));
        let c = usize::from((low | high) & 0x1f);
        out.push(char::from(ALPHABET[c]));
    }

    out
}

/// Decode a string into `len` bytes
///
/// Returns `None` if the string has the wrong length for `len` bytes,
/// contains a character outside the alphabet, or carries bits beyond `len`.
#[must_use]
pub fn decode(s: &str, len: usize) -> Option<Vec<u8>> {
    if s.len() != encoded_len(len) {
        return None;
    }

    let mut bytes = vec![0u8; len];

    for (n, c) in s.bytes().rev().enumerate() {
        let digit = ALPHABET.iter().position(|&a| a == c)?;
        let digit = u16::try_from(digit).ok()?;
        let b = n * 5;
        let i = b / 8;
        let j = b % 8;
        let shifted = digit << j;
        bytes[i] |= u8::try_from(shifted & 0xff).ok()?;
        let carry = shifted >> 8;
        if i + 1 < len {
            bytes[i + 1] |= u8::try_from(carry).ok()?;
        } else if carry != 0 {
            return None;
        }
    }

    Some(bytes)
}
