use crate::{Error, SessionKey};
use aes_gcm::aead::{generic_array::GenericArray, Aead, NewAead};
use aes_gcm::Aes256Gcm;
use rand::{thread_rng, Rng};

const NONCE_LENGTH: usize = 12;

/// A voter's plaintext selection, bound to the session it was cast in.
///
/// The embedded session code lets the tally reject records that were cast
/// under a different election run sharing the same storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub session_code: String,
    pub choice: String,
}

impl Ballot {
    pub fn new(session_code: &str, choice: &str) -> Self {
        Ballot {
            session_code: session_code.to_string(),
            choice: choice.to_string(),
        }
    }

    /// Encrypt this ballot under the session key.
    ///
    /// The ballot is serialized to CBOR (length-delimited fields, so a
    /// candidate name can never bleed into the session code) and sealed
    /// with AES-256-GCM under a freshly drawn random nonce. Two identical
    /// ballots therefore produce unrelated envelopes on disk.
    pub fn encrypt(&self, key: &SessionKey) -> BallotEnvelope {
        let plaintext =
            serde_cbor::to_vec(self).expect("wevote: ballot serialization failure!");
        BallotEnvelope(seal(key, &plaintext))
    }
}

/// The opaque encrypted-and-authenticated form of a single [`Ballot`].
///
/// Layout is `nonce || ciphertext+tag`; the envelope is self-contained and
/// needs only the session key to open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BallotEnvelope(#[serde(with = "hex_serde")] Vec<u8>);

impl BallotEnvelope {
    /// Wrap raw envelope bytes as read back from storage.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        BallotEnvelope(bytes)
    }

    /// View the envelope bytes, ready to persist.
    #[inline]
    pub fn as_bytes<'a>(&'a self) -> &'a [u8] {
        &self.0
    }

    /// Decrypt back into the plaintext ballot.
    ///
    /// Fails with `DecryptionFailed` when authentication fails - wrong key,
    /// corrupted bytes, or a truncated envelope all look identical, so the
    /// caller learns nothing about which it was. Fails with
    /// `MalformedBallot` when the authenticated plaintext does not parse as
    /// a ballot; that never happens for envelopes we produced ourselves but
    /// foreign input must not crash the tally.
    pub fn decrypt(&self, key: &SessionKey) -> Result<Ballot, Error> {
        let plaintext = open(key, &self.0)?;
        serde_cbor::from_slice(&plaintext).map_err(|_| Error::MalformedBallot)
    }
}

fn seal(key: &SessionKey, plaintext: &[u8]) -> Vec<u8> {
    let aead = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_LENGTH];
    thread_rng().fill(&mut nonce);
    let nonce = GenericArray::from_slice(&nonce);

    let ciphertext = aead
        .encrypt(nonce, plaintext)
        .expect("wevote: ballot encryption failure!");

    let mut envelope = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    envelope.extend(nonce);
    envelope.extend(ciphertext);

    envelope
}

fn open(key: &SessionKey, envelope: &[u8]) -> Result<Vec<u8>, Error> {
    if envelope.len() <= NONCE_LENGTH {
        return Err(Error::DecryptionFailed);
    }
    let aead = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    let nonce = GenericArray::from_slice(&envelope[..NONCE_LENGTH]);
    let encrypted = &envelope[NONCE_LENGTH..];

    aead.decrypt(nonce, encrypted)
        .map_err(|_| Error::DecryptionFailed)
}
