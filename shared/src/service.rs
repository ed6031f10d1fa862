use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{PollError, Result};
use crate::models::{BatchOutcome, Poll, PollResult, PollSummary, Vote, VoteOutcome};
use crate::store::PollStore;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Validation and batching in front of a shared [`PollStore`].
///
/// Holds no state besides the store handle; clones share the same store.
#[derive(Debug, Clone)]
pub struct AggregationService {
    store: Arc<PollStore>,
    max_batch_size: usize,
}

impl AggregationService {
    pub fn new(store: Arc<PollStore>) -> Self {
        Self {
            store,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn store(&self) -> &PollStore {
        &self.store
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn create_poll(&self, poll: Poll) -> Result<()> {
        let poll_id = poll.id.clone();
        match self.store.create_poll(poll) {
            Ok(()) => {
                info!(poll_id = %poll_id, "Poll created");
                Ok(())
            }
            Err(e) => {
                warn!(poll_id = %poll_id, "Poll creation rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn cast_vote(&self, vote: &Vote) -> Result<()> {
        // The store re-checks under its own lock; this only fails fast.
        if !self.store.contains(&vote.poll_id) {
            debug!(poll_id = %vote.poll_id, "Vote for unknown poll");
            return Err(PollError::PollNotFound(vote.poll_id.clone()));
        }
        self.store.cast_vote(&vote.poll_id, &vote.option)?;
        debug!(poll_id = %vote.poll_id, option = %vote.option, "Vote accepted");
        Ok(())
    }

    /// Casts every vote in `votes` on its own. A rejected vote leaves the
    /// others applied; only an empty or oversized batch fails as a whole.
    pub fn cast_votes(&self, votes: &[Vote]) -> Result<BatchOutcome> {
        if votes.is_empty() {
            return Err(PollError::InvalidBatch("batch contains no votes".into()));
        }
        if votes.len() > self.max_batch_size {
            return Err(PollError::InvalidBatch(format!(
                "batch of {} votes exceeds maximum of {}",
                votes.len(),
                self.max_batch_size
            )));
        }

        let outcome: BatchOutcome = votes
            .iter()
            .map(|vote| VoteOutcome::new(vote, self.cast_vote(vote)))
            .collect();

        if outcome.rejected > 0 {
            warn!(accepted = outcome.accepted, rejected = outcome.rejected, "Batch partially applied");
        }
        Ok(outcome)
    }

    pub fn results(&self, poll_id: &str) -> Result<PollResult> {
        self.store.snapshot(poll_id)
    }

    pub fn poll(&self, poll_id: &str) -> Result<Poll> {
        self.store.get_poll(poll_id)
    }

    pub fn polls(&self) -> Vec<PollSummary> {
        self.store.polls()
    }
}
