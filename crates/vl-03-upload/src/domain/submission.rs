//! # Upload Submission
//!
//! One upload attempt tracked from staging to its terminal phase. The
//! submission id is the correlation key every bus event about the attempt
//! carries.

use serde::{Deserialize, Serialize};
use shared_types::entities::{TxHash, UploadPhase, Video};
use uuid::Uuid;

/// A single upload attempt.
///
/// Fields fill in as the attempt progresses: `hash` once the bytes are
/// stored, `tx_hash` once broadcast, and exactly one of `video` or `error`
/// once the phase is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Correlation id carried by every event about this attempt.
    pub id: Uuid,
    /// Title the video will carry on chain.
    pub title: String,
    /// Current lifecycle phase.
    pub phase: UploadPhase,
    /// Content identifier, once the bytes are stored.
    pub hash: Option<String>,
    /// Transaction hash, once broadcast.
    pub tx_hash: Option<TxHash>,
    /// The on-chain video, once confirmed.
    pub video: Option<Video>,
    /// Terminal error description, set when the phase is `Failed`.
    pub error: Option<String>,
}

impl Submission {
    /// Fresh submission in the idle phase.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            phase: UploadPhase::Idle,
            hash: None,
            tx_hash: None,
            video: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_starts_idle() {
        let submission = Submission::new("Intro");
        assert_eq!(submission.title, "Intro");
        assert_eq!(submission.phase, UploadPhase::Idle);
        assert!(submission.hash.is_none());
        assert!(submission.tx_hash.is_none());
        assert!(submission.video.is_none());
        assert!(submission.error.is_none());
    }

    #[test]
    fn test_submissions_get_distinct_ids() {
        assert_ne!(Submission::new("a").id, Submission::new("b").id);
    }
}
