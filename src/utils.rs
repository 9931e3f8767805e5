use blake2::{digest::consts::U32, Blake2b, Digest};
use rustc_hex::{FromHex, FromHexError};

type Blake2b256 = Blake2b<U32>;

pub fn blake2_256<S: AsRef<[u8]>>(bytes: &[S]) -> [u8; 32] {
    //! Compute blake2b hash with 32-byte digest.
    //!
    //! Builds a hash iteratively by updating with every element
    //! of the input sequence.
    let mut hasher = Blake2b256::new();
    bytes.iter().for_each(|b| hasher.update(b));
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Decode a hex string, with or without `0x` prefix.
pub(crate) fn decode_hex(hex: &str) -> Result<Vec<u8>, FromHexError> {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
        .from_hex()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_blake2_256_is_incremental() {
        assert_eq!(
            blake2_256(&["send(", "uint256)"]),
            blake2_256(&["send(uint256)"])
        );
    }

    #[test]
    fn test_decode_hex_prefix() {
        assert_eq!(decode_hex("0x0aff").unwrap(), vec![0x0a, 0xff]);
        assert_eq!(decode_hex("0Xff").unwrap(), vec![0xff]);
        assert_eq!(decode_hex("0aff").unwrap(), vec![0x0a, 0xff]);
        assert!(decode_hex("0xzz").is_err());
    }
}
