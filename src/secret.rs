use crate::Error;
use data_encoding::BASE32_NOPAD;
use rand::TryRngCore;
use rand::rngs::OsRng;

/// RFC 4648 Base32 alphabet, https://datatracker.ietf.org/doc/html/rfc4648#section-6
pub const SECRET_CHARS: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
/// Raw secret size before Base32 encoding
pub const SECRET_LENGTH: usize = 16;

/// Create a new shared secret for provisioning
///
/// Draws [`SECRET_LENGTH`] bytes from the OS random source, maps each one onto
/// [`SECRET_CHARS`] (`byte % 32` is uniform since 256 = 8 * 32) and encodes the
/// result as unpadded Base32
///
/// # Errors
///
/// Returns [`Error::RandomSourceFailure`] when the OS random source cannot be read
pub fn new_secret() -> Result<String, Error> {
    let mut bytes = [0u8; SECRET_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::RandomSourceFailure(Box::new(e)))?;

    for b in &mut bytes {
        *b = SECRET_CHARS[usize::from(*b) % SECRET_CHARS.len()];
    }

    let secret = BASE32_NOPAD.encode(&bytes);

    #[cfg(feature = "zeroize")]
    zeroize::Zeroize::zeroize(&mut bytes);

    Ok(secret)
}
