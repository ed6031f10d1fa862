use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, PollError};

/// A question with a fixed, ordered list of options. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl Poll {
    pub fn new(id: impl Into<String>, question: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|opt| opt == option)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub poll_id: String,
    pub option: String,
}

impl Vote {
    pub fn new(poll_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            poll_id: poll_id.into(),
            option: option.into(),
        }
    }
}

/// Point-in-time copy of a poll and its tally.
///
/// `total_votes` always equals the sum of `results`; both were read under the
/// same tally guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollResult {
    pub poll: Poll,
    pub results: HashMap<String, u64>,
    pub total_votes: u64,
    pub taken_at: OffsetDateTime,
}

impl PollResult {
    pub fn count(&self, option: &str) -> u64 {
        self.results.get(option).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollSummary {
    pub id: String,
    pub question: String,
    pub option_count: usize,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    pub options: Vec<String>,
}

impl CreatePollRequest {
    /// Builds the poll, assigning a random id when the caller did not pick one.
    pub fn into_poll(self) -> Poll {
        Poll {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            question: self.question,
            options: self.options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteOutcome {
    pub poll_id: String,
    pub option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

impl VoteOutcome {
    pub fn new(vote: &Vote, result: Result<(), PollError>) -> Self {
        Self {
            poll_id: vote.poll_id.clone(),
            option: vote.option.clone(),
            error: result.err().map(Error::from),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-vote results of a best-effort batch. Accepted votes stay applied
/// regardless of what happened to their neighbours.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchOutcome {
    pub accepted: usize,
    pub rejected: usize,
    pub results: Vec<VoteOutcome>,
}

impl BatchOutcome {
    pub fn record(&mut self, outcome: VoteOutcome) {
        if outcome.is_accepted() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
        self.results.push(outcome);
    }
}

impl FromIterator<VoteOutcome> for BatchOutcome {
    fn from_iter<I: IntoIterator<Item = VoteOutcome>>(iter: I) -> Self {
        let mut batch = BatchOutcome::default();
        iter.into_iter().for_each(|outcome| batch.record(outcome));
        batch
    }
}
