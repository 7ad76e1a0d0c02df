//! Random code generation for one-time passwords.

use rand::Rng;

/// Number of digits in a one-time login code.
pub const OTP_CODE_LENGTH: usize = 6;

/// Generates a numeric code of `len` digits, each drawn independently.
///
/// Leading zeros are kept, so the result always has exactly `len` characters.
pub fn generate_numeric_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Returns true if `code` is exactly `len` ASCII digits.
pub fn is_numeric_code(code: &str, len: usize) -> bool {
    code.len() == len && code.bytes().all(|b| b.is_ascii_digit())
}
