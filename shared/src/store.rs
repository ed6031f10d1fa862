//! In-memory poll registry and per-poll vote tallies.
//!
//! The registry maps poll ids to entries behind one `RwLock`; it is only
//! write-locked by `create_poll`. Each entry owns its own tally `Mutex`, so
//! votes on different polls never contend and a registry lookup is released
//! before the tally is touched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Serialize, Deserialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::{PollError, Result};
use crate::models::{BatchOutcome, Poll, PollResult, PollSummary, Vote, VoteOutcome};
use crate::validation::validate_poll;

/// What to do with a vote for an option the poll never declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyPolicy {
    /// Reject with `PollError::InvalidOption`.
    #[default]
    Strict,
    /// Count it in a bucket of its own.
    Permissive,
}

#[derive(Debug, Default)]
struct Tally {
    counts: HashMap<String, u64>,
    total: u64,
}

#[derive(Debug)]
struct PollEntry {
    poll: Poll,
    created_at: OffsetDateTime,
    tally: Mutex<Tally>,
}

impl PollEntry {
    fn new(poll: Poll) -> Self {
        let counts = poll.options.iter().map(|opt| (opt.clone(), 0)).collect();
        Self {
            poll,
            created_at: OffsetDateTime::now_utc(),
            tally: Mutex::new(Tally { counts, total: 0 }),
        }
    }

    // Nothing between the two increments in `cast_vote` can panic, so a
    // poisoned tally is still a consistent one.
    fn tally(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(|poisoned| {
            warn!(poll_id = %self.poll.id, "Recovering poisoned tally lock");
            poisoned.into_inner()
        })
    }

    fn summary(&self) -> PollSummary {
        PollSummary {
            id: self.poll.id.clone(),
            question: self.poll.question.clone(),
            option_count: self.poll.options.len(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Default)]
pub struct PollStore {
    polls: RwLock<HashMap<String, Arc<PollEntry>>>,
    policy: TallyPolicy,
}

impl PollStore {
    pub fn new(policy: TallyPolicy) -> Self {
        Self {
            polls: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> TallyPolicy {
        self.policy
    }

    fn registry(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<PollEntry>>> {
        self.polls.read().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned poll registry lock");
            poisoned.into_inner()
        })
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<PollEntry>>> {
        self.polls.write().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned poll registry lock");
            poisoned.into_inner()
        })
    }

    fn entry(&self, poll_id: &str) -> Result<Arc<PollEntry>> {
        self.registry()
            .get(poll_id)
            .cloned()
            .ok_or_else(|| PollError::PollNotFound(poll_id.to_string()))
    }

    /// Registers a poll together with its zeroed tally.
    ///
    /// The entry is fully built before the registry lock is taken, so readers
    /// either see no poll or a poll with its tally.
    pub fn create_poll(&self, poll: Poll) -> Result<()> {
        validate_poll(&poll)?;
        let entry = Arc::new(PollEntry::new(poll));

        let mut polls = self.registry_mut();
        if polls.contains_key(&entry.poll.id) {
            return Err(PollError::PollAlreadyExists(entry.poll.id.clone()));
        }
        debug!(poll_id = %entry.poll.id, options = entry.poll.options.len(), "Poll registered");
        polls.insert(entry.poll.id.clone(), entry);
        Ok(())
    }

    pub fn get_poll(&self, poll_id: &str) -> Result<Poll> {
        self.entry(poll_id).map(|entry| entry.poll.clone())
    }

    pub fn contains(&self, poll_id: &str) -> bool {
        self.registry().contains_key(poll_id)
    }

    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    /// Summaries of every registered poll, oldest first.
    pub fn polls(&self) -> Vec<PollSummary> {
        let mut summaries: Vec<_> = self.registry().values().map(|entry| entry.summary()).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Adds exactly one vote to `option`.
    ///
    /// The increment happens under the poll's own tally guard; other polls
    /// are never blocked.
    pub fn cast_vote(&self, poll_id: &str, option: &str) -> Result<()> {
        let entry = self.entry(poll_id)?;

        let declared = entry.poll.has_option(option);
        if option.is_empty() || (!declared && self.policy == TallyPolicy::Strict) {
            return Err(PollError::InvalidOption {
                poll_id: poll_id.to_string(),
                option: option.to_string(),
            });
        }

        let mut tally = entry.tally();
        match tally.counts.get_mut(option) {
            Some(count) => *count += 1,
            None => {
                tally.counts.insert(option.to_string(), 1);
            }
        }
        tally.total += 1;
        Ok(())
    }

    /// Applies each vote independently. Failures are reported per vote and do
    /// not undo votes already applied.
    pub fn cast_votes(&self, votes: &[Vote]) -> BatchOutcome {
        votes
            .iter()
            .map(|vote| VoteOutcome::new(vote, self.cast_vote(&vote.poll_id, &vote.option)))
            .collect()
    }

    pub fn snapshot(&self, poll_id: &str) -> Result<PollResult> {
        let entry = self.entry(poll_id)?;

        let (results, total_votes, taken_at) = {
            let tally = entry.tally();
            (tally.counts.clone(), tally.total, OffsetDateTime::now_utc())
        };

        Ok(PollResult {
            poll: entry.poll.clone(),
            results,
            total_votes,
            taken_at,
        })
    }
}
