use crate::{Ballot, BallotEnvelope, SessionKey};
use indexmap::IndexMap;
use log::warn;
use std::cmp::Reverse;
use thiserror::Error;

/// Why a ballot record was excluded from the count.
///
/// These are classifications, not hard errors: each one bumps the invalid
/// total and the tally moves on to the next record.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("ballot failed to decrypt")]
    DecryptionFailed,

    #[error("decrypted ballot is malformed")]
    MalformedBallot,

    #[error("ballot was cast under a different session")]
    SessionMismatch,

    #[error("ballot names an unregistered candidate")]
    UnknownCandidate,
}

/// A stored ballot as handed over by the record feed: an opaque id
/// (typically the filename it was persisted under) plus the envelope.
///
/// The id is never interpreted, only echoed in rejection logs.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BallotRecord {
    pub id: String,
    pub envelope: BallotEnvelope,
}

impl BallotRecord {
    pub fn new(id: &str, envelope: BallotEnvelope) -> Self {
        BallotRecord {
            id: id.to_string(),
            envelope,
        }
    }
}

/// One row of the ranked results.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: String,
    pub votes: u64,
    pub percent: f64,
}

/// The outcome of decrypting and counting every stored ballot.
///
/// Built fresh on each tally run and never persisted by this crate;
/// exporting it is the presentation layer's business.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TallyResult {
    pub session_code: String,

    /// Per-candidate vote counts, in candidate registration order.
    ///
    /// Hashmaps are not allowed because their unstable ordering leads to
    /// non-determinism.
    pub counts: IndexMap<String, u64>,

    pub total_valid: u64,
    pub invalid: u64,

    /// Candidates ordered by votes descending; ties keep registration order.
    pub ranking: Vec<RankedCandidate>,
}

impl TallyResult {
    /// Decrypt and count a collection of stored ballots.
    ///
    /// Every registered candidate gets a count, zero included. Records are
    /// attempted exactly once; a record that fails to decrypt, parses to
    /// garbage, carries the wrong session code, or names an unregistered
    /// candidate is absorbed into the invalid total and never aborts the
    /// pass. Given identical inputs the result is identical; reordering the
    /// records changes neither the counts nor the ranking.
    pub fn tally(
        key: &SessionKey,
        records: &[BallotRecord],
        active_session_code: &str,
        candidates: &[String],
    ) -> Self {
        let mut counts: IndexMap<String, u64> = IndexMap::with_capacity(candidates.len());
        for candidate in candidates {
            counts.insert(candidate.clone(), 0);
        }

        let mut total_valid: u64 = 0;
        let mut invalid: u64 = 0;

        for record in records {
            match check_record(record, key, active_session_code, &counts) {
                Ok(ballot) => {
                    *counts.get_mut(&ballot.choice).unwrap() += 1;
                    total_valid += 1;
                }
                Err(rejection) => {
                    invalid += 1;
                    warn!("ballot record {} not counted: {}", record.id, rejection);
                }
            }
        }

        let mut ranking: Vec<RankedCandidate> = counts
            .iter()
            .map(|(candidate, &votes)| RankedCandidate {
                candidate: candidate.clone(),
                votes,
                percent: percent(votes, total_valid),
            })
            .collect();
        // Stable sort: tied candidates keep their registration order.
        ranking.sort_by_key(|ranked| Reverse(ranked.votes));

        TallyResult {
            session_code: active_session_code.to_string(),
            counts,
            total_valid,
            invalid,
            ranking,
        }
    }

    /// The top-ranked candidate, or `None` when no valid votes were cast.
    pub fn winner(&self) -> Option<&RankedCandidate> {
        self.ranking.first().filter(|ranked| ranked.votes > 0)
    }
}

/// Validate a single record, yielding either the plaintext ballot or the
/// reason it cannot be counted.
fn check_record(
    record: &BallotRecord,
    key: &SessionKey,
    active_session_code: &str,
    counts: &IndexMap<String, u64>,
) -> Result<Ballot, Rejection> {
    let ballot = record.envelope.decrypt(key).map_err(|e| match e {
        crate::Error::MalformedBallot => Rejection::MalformedBallot,
        _ => Rejection::DecryptionFailed,
    })?;

    if ballot.session_code != active_session_code {
        return Err(Rejection::SessionMismatch);
    }
    if !counts.contains_key(&ballot.choice) {
        return Err(Rejection::UnknownCandidate);
    }

    Ok(ballot)
}

fn percent(votes: u64, total_valid: u64) -> f64 {
    if total_valid > 0 {
        votes as f64 / total_valid as f64 * 100.0
    } else {
        0.0
    }
}
