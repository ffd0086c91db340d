//! Record types for the decision ledger
//!
//! - `Submitter`: opaque identity token used as the partition key
//! - `DecisionDraft`: caller-supplied fields, unvalidated
//! - `DecisionFields`: the same fields after validation
//! - `DecisionRecord`: an appended, immutable entry

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// Identity attributed to an append.
///
/// The ledger never interprets the token; it is only compared for equality
/// and used as the key of the per-submitter sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submitter(String);

impl Submitter {
    pub fn new(token: impl Into<String>) -> Self {
        Submitter(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn ensure_present(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptySubmitter);
        }
        Ok(())
    }
}

impl From<&str> for Submitter {
    fn from(s: &str) -> Self {
        Submitter(s.to_string())
    }
}

impl From<String> for Submitter {
    fn from(s: String) -> Self {
        Submitter(s)
    }
}

impl std::fmt::Display for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DecisionDraft / DecisionFields
// ---------------------------------------------------------------------------

/// Fields supplied by a caller to `store_decision`.
///
/// `participant_id` is carried wide and signed so that negative or oversized
/// values coming from an external caller reach the ledger and are rejected
/// there, instead of being truncated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionDraft {
    pub database_cid: String,
    pub explanation_cid: String,
    pub decision: String,
    pub participant_id: i128,
}

impl DecisionDraft {
    pub fn new(
        database_cid: impl Into<String>,
        explanation_cid: impl Into<String>,
        decision: impl Into<String>,
        participant_id: impl Into<i128>,
    ) -> Self {
        Self {
            database_cid: database_cid.into(),
            explanation_cid: explanation_cid.into(),
            decision: decision.into(),
            participant_id: participant_id.into(),
        }
    }

    /// Check every field and narrow the participant id to `u64`.
    pub fn validate(self) -> Result<DecisionFields, ValidationError> {
        non_empty("database_cid", &self.database_cid)?;
        non_empty("explanation_cid", &self.explanation_cid)?;
        non_empty("decision", &self.decision)?;
        let participant_id = u64::try_from(self.participant_id).map_err(|_| {
            ValidationError::ParticipantOutOfRange {
                value: self.participant_id,
            }
        })?;

        Ok(DecisionFields {
            database_cid: self.database_cid,
            explanation_cid: self.explanation_cid,
            decision: self.decision,
            participant_id,
        })
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Parse a participant id as typed by a human or received over a text
/// transport. Range checking is left to [`DecisionDraft::validate`].
pub fn parse_participant_id(raw: &str) -> Result<i128, ValidationError> {
    raw.trim()
        .parse::<i128>()
        .map_err(|_| ValidationError::ParticipantNotInteger {
            raw: raw.to_string(),
        })
}

/// Validated content fields of a decision. Only obtainable through
/// [`DecisionDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionFields {
    database_cid: String,
    explanation_cid: String,
    decision: String,
    participant_id: u64,
}

impl DecisionFields {
    pub fn participant_id(&self) -> u64 {
        self.participant_id
    }

    pub fn decision(&self) -> &str {
        &self.decision
    }

    /// Attach the ledger-assigned attribution and position.
    pub(crate) fn into_record(self, submitter: Submitter, index: u64) -> DecisionRecord {
        DecisionRecord {
            submitter,
            index,
            database_cid: self.database_cid,
            explanation_cid: self.explanation_cid,
            decision: self.decision,
            participant_id: self.participant_id,
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionRecord
// ---------------------------------------------------------------------------

/// One immutable decision entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Identity that appended this record
    pub submitter: Submitter,
    /// Position in the submitter's sequence (0-based)
    pub index: u64,
    /// Content address of the database snapshot the decision was made against
    pub database_cid: String,
    /// Content address of the explanation artifact
    pub explanation_cid: String,
    /// Free-form decision label
    pub decision: String,
    /// Subject of the decision
    pub participant_id: u64,
}

impl DecisionRecord {
    /// The four content fields, in call order of `store_decision`.
    pub fn fields(&self) -> (&str, &str, &str, u64) {
        (
            &self.database_cid,
            &self.explanation_cid,
            &self.decision,
            self.participant_id,
        )
    }

    /// SHA-256 over the length-prefixed fields, in declaration order.
    pub fn digest(&self) -> RecordDigest {
        let mut hasher = Sha256::new();
        for part in [
            self.submitter.as_str().as_bytes(),
            self.database_cid.as_bytes(),
            self.explanation_cid.as_bytes(),
            self.decision.as_bytes(),
        ] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part);
        }
        hasher.update(self.index.to_be_bytes());
        hasher.update(self.participant_id.to_be_bytes());
        RecordDigest(hex::encode(hasher.finalize()))
    }
}

/// Hex SHA-256 digest identifying a record's exact content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordDigest(String);

impl RecordDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for RecordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
