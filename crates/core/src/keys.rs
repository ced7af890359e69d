//! Application-server key decoding for push subscriptions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::Error;

/// Length of an uncompressed P-256 public key.
pub const APPLICATION_SERVER_KEY_LEN: usize = 65;

/// Decode a base64url string into bytes.
///
/// Pads to a multiple of four with `=`, maps the URL-safe alphabet back to
/// the standard one, then decodes as standard base64.
pub fn url_base64_to_bytes(input: &str) -> Result<Vec<u8>, Error> {
    let padding = "=".repeat((4 - input.len() % 4) % 4);
    let standard: String = format!("{input}{padding}")
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    STANDARD
        .decode(standard)
        .map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Decode and sanity-check a VAPID application-server public key.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>, Error> {
    let bytes = url_base64_to_bytes(key.trim())?;
    if bytes.len() != APPLICATION_SERVER_KEY_LEN || bytes[0] != 0x04 {
        return Err(Error::InvalidKey(format!(
            "expected a {APPLICATION_SERVER_KEY_LEN}-byte uncompressed point, got {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "BEl62iUYgUivxIkv69yViEuiBIa40HI9stpf_kznoHRBSTtfn2H-YsGnVeRWqf_w8D8tVbp_r1pSUjT0HDkQZC0";

    #[test]
    fn test_decode_known_key() {
        let bytes = decode_application_server_key(KEY).unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 0x04);
    }

    #[test]
    fn test_url_safe_alphabet_translated() {
        assert_eq!(url_base64_to_bytes("-_8").unwrap(), vec![0xFB, 0xFF]);
    }

    #[test]
    fn test_padding_added() {
        assert_eq!(url_base64_to_bytes("aGk").unwrap(), b"hi".to_vec());
        assert_eq!(url_base64_to_bytes("aGk=").unwrap(), b"hi".to_vec());
        assert_eq!(url_base64_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(url_base64_to_bytes("!!!"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_wrong_length_key() {
        assert!(matches!(decode_application_server_key("aGk"), Err(Error::InvalidKey(_))));
    }
}
