use crate::Error;
use hex::FromHex;
use rand::RngCore;
use std::fmt;

/// Required key length in bytes (AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// Symmetric key protecting every ballot cast in one election session.
///
/// Generated once by the administrator when the election starts and handed
/// to voters inside the shared election config. A `SessionKey` is always
/// complete key material of the required length; there is no way to
/// construct a partial one.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_LENGTH]);

impl SessionKey {
    /// Generate a fresh key from the operating system CSPRNG.
    ///
    /// Every call draws independent entropy.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng {};
        let mut bytes = [0u8; KEY_LENGTH];
        csprng.fill_bytes(&mut bytes);
        SessionKey(bytes)
    }

    /// View the raw key material.
    #[inline]
    pub fn as_bytes<'a>(&'a self) -> &'a [u8; KEY_LENGTH] {
        &self.0
    }

    /// Construct a `SessionKey` from raw bytes.
    ///
    /// Fails with `KeyBadLen` unless exactly [`KEY_LENGTH`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != KEY_LENGTH {
            return Err(Error::KeyBadLen);
        }
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(bytes);
        Ok(SessionKey(key))
    }

    /// Encode the key as lowercase hex for embedding in a text config.
    pub fn export(&self) -> String {
        hex::encode(&self.0)
    }

    /// Inverse of [`export`](Self::export).
    ///
    /// Validated eagerly so a corrupt config field is caught at load time,
    /// not at the first decryption attempt.
    pub fn import(text: &str) -> Result<Self, Error> {
        let bytes = <[u8; KEY_LENGTH]>::from_hex(text).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { .. } => Error::KeyBadHex,
            _ => Error::KeyBadLen,
        })?;
        Ok(SessionKey(bytes))
    }
}

// Key material must never end up in logs or error output.
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SessionKey(..)")
    }
}

impl serde::Serialize for SessionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.export())
    }
}

impl<'de> serde::Deserialize<'de> for SessionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        SessionKey::import(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_fresh() {
        let k1 = SessionKey::generate();
        let k2 = SessionKey::generate();
        assert_ne!(k1, k2);
    }

    #[test]
    fn export_import_round_trip() {
        let key = SessionKey::generate();
        let text = key.export();
        assert_eq!(text.len(), KEY_LENGTH * 2);
        let restored = SessionKey::import(&text).unwrap();
        assert_eq!(key, restored);
    }

    #[test]
    fn import_rejects_bad_hex() {
        let mut text = SessionKey::generate().export();
        text.replace_range(0..1, "z");
        match SessionKey::import(&text) {
            Err(Error::KeyBadHex) => (),
            other => panic!("expected KeyBadHex, got {:?}", other),
        }
    }

    #[test]
    fn import_rejects_wrong_length() {
        // Valid hex, but 31 bytes
        match SessionKey::import(&"ab".repeat(KEY_LENGTH - 1)) {
            Err(Error::KeyBadLen) => (),
            other => panic!("expected KeyBadLen, got {:?}", other),
        }
        // Odd number of hex digits
        assert!(SessionKey::import("abc").is_err());
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(SessionKey::from_bytes(&[0u8; KEY_LENGTH]).is_ok());
        assert!(SessionKey::from_bytes(&[0u8; KEY_LENGTH - 1]).is_err());
        assert!(SessionKey::from_bytes(&[0u8; KEY_LENGTH + 1]).is_err());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SessionKey::generate();
        let printed = format!("{:?}", key);
        assert!(!printed.contains(&key.export()));
    }
}
