use crate::{Error, SessionKey};
use rand::{thread_rng, Rng};

/// Session codes are short enough to read out to voters.
pub const SESSION_CODE_LENGTH: usize = 6;

const SESSION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh session code for a new election run.
///
/// Codes are compared verbatim at tally time, so the charset sticks to
/// unambiguous uppercase alphanumerics.
pub fn generate_session_code() -> String {
    let mut rng = thread_rng();
    (0..SESSION_CODE_LENGTH)
        .map(|_| SESSION_CODE_CHARSET[rng.gen_range(0, SESSION_CODE_CHARSET.len())] as char)
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Active,
    Ended,
}

/// The shared election artifact.
///
/// Written by the administrator when the election starts and distributed to
/// every ballot-casting client, which needs the session code and key to
/// seal votes. The whole record is validated when loaded so a corrupt
/// artifact fails immediately rather than at the first ballot.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElectionConfig {
    pub session_code: String,
    pub candidates: Vec<String>,
    pub key: SessionKey,
    pub status: ElectionStatus,
}

impl ElectionConfig {
    /// Start a new election: fresh session code, fresh key, status active.
    pub fn new(candidates: Vec<String>) -> Result<Self, Error> {
        let config = ElectionConfig {
            session_code: generate_session_code(),
            candidates,
            key: SessionKey::generate(),
            status: ElectionStatus::Active,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config artifact.
    ///
    /// A malformed embedded key surfaces here as a deserialization error;
    /// it is never deferred to the first decryption attempt.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: ElectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("wevote: election config serialization failure!")
    }

    /// Close voting. The key stays valid so the tally can still run.
    pub fn end(&mut self) {
        self.status = ElectionStatus::Ended;
    }

    fn validate(&self) -> Result<(), Error> {
        if self.candidates.is_empty() {
            return Err(Error::NoCandidates);
        }
        for (i, candidate) in self.candidates.iter().enumerate() {
            if self.candidates[..i].contains(candidate) {
                return Err(Error::DuplicateCandidate(candidate.clone()));
            }
        }
        Ok(())
    }
}
