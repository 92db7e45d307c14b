//! Session token generation.

use rand::Rng;

/// Generates a random 32-character hex string (128 bits).
///
/// Tokens identify one authentication of one connection. They are fresh
/// on every call but are not a credential: nothing on the server ever
/// checks one.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
