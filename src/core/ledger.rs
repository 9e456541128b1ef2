use crate::domain::model::{ResetToken, Snapshot};
use crate::utils::error::{PollError, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

/// In-memory vote accounting for a single poll.
///
/// Invariant: the sum of all counts equals the number of registered voters.
#[derive(Debug)]
pub struct Ledger {
    votes: HashMap<String, u64>,
    voters: HashSet<String>,
    epoch_millis: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            votes: HashMap::new(),
            voters: HashSet::new(),
            epoch_millis: Utc::now().timestamp_millis(),
        }
    }

    /// Count one vote for `choice` on behalf of `voter_id`.
    ///
    /// Nothing is mutated when this returns an error. An empty `voter_id` is
    /// an ordinary identifier: it may vote once per epoch like any other.
    pub fn submit(&mut self, choice: &str, voter_id: &str) -> Result<()> {
        if choice.is_empty() {
            return Err(PollError::invalid_input("No choice"));
        }
        if self.voters.contains(voter_id) {
            return Err(PollError::DuplicateVoter {
                voter_id: voter_id.to_string(),
            });
        }

        self.voters.insert(voter_id.to_string());
        *self.votes.entry(choice.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// Clear counts and voters and start a new epoch.
    pub fn reset(&mut self) -> ResetToken {
        self.votes.clear();
        self.voters.clear();
        // two resets in the same millisecond must still yield distinct tokens
        self.epoch_millis = Utc::now().timestamp_millis().max(self.epoch_millis + 1);
        self.reset_token()
    }

    pub fn reset_token(&self) -> ResetToken {
        ResetToken::new(self.epoch_millis.to_string())
    }

    pub fn total_voters(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.voters.contains(voter_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            votes: self.votes.clone(),
            total_voters: self.voters.len(),
            reset_token: self.reset_token(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
