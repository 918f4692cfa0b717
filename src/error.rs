use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("wevote: invalid session key - invalid hexadecimal")]
    KeyBadHex,

    #[error("wevote: invalid session key - wrong length")]
    KeyBadLen,

    #[error("wevote: failed to decrypt ballot")]
    DecryptionFailed,

    #[error("wevote: decrypted ballot is malformed")]
    MalformedBallot,

    #[error("wevote: JSON error deserializing election config: {0}")]
    ConfigDeserialization(#[from] serde_json::Error),

    #[error("wevote: election config has no candidates")]
    NoCandidates,

    #[error("wevote: election config lists candidate '{0}' more than once")]
    DuplicateCandidate(String),
}
