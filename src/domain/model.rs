use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque marker for the current voting epoch. Changes only on reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResetToken(String);

impl ResetToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What every results viewer receives: counts, distinct voters, epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub votes: HashMap<String, u64>,
    pub total_voters: usize,
    pub reset_token: ResetToken,
}

impl Snapshot {
    pub fn count_for(&self, choice: &str) -> u64 {
        self.votes.get(choice).copied().unwrap_or(0)
    }
}

/// Body of `POST /api/vote`. Both fields are optional at the wire level so
/// that a missing field becomes a 400 rather than a deserializer rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub choice: Option<String>,
    pub voter_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub ok: bool,
    pub reset_token: ResetToken,
}

impl Accepted {
    pub fn new(reset_token: ResetToken) -> Self {
        Self {
            ok: true,
            reset_token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub reset_token: ResetToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteUrl {
    pub url: String,
}
