// md4.rs -- level fingerprint (MD4 block checksum)
// Delegates the digest itself to the `md4` crate (RustCrypto).

use md4::{Digest, Md4};

/// Compute a block checksum by XORing all four MD4 digest words.
///
/// The digest words are always read little-endian, so the same bytes give
/// the same checksum on every host.
pub fn com_block_checksum(data: &[u8]) -> u32 {
    let digest = Md4::digest(data);

    digest
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .fold(0, |acc, w| acc ^ w)
}
