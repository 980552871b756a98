//! State enums for accounts, sessions, verification, and ledger entries.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The declared marketplace role of an account.
///
/// Role and verification are orthogonal: declaring `Teacher` grants nothing
/// until verification approves the account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Books sessions and spends credits.
    Learner,
    /// Offers sessions and earns credits (once verified).
    Teacher,
    /// Alternates between both sides.
    Swapper,
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learner" => Ok(Self::Learner),
            "teacher" => Ok(Self::Teacher),
            "swapper" => Ok(Self::Swapper),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

/// The verification standing of an account, a cached projection of its
/// latest verification request outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Never applied.
    None,
    /// A request is awaiting review.
    Pending,
    /// Approved — the account may teach.
    Approved,
    /// Rejected — may resubmit.
    Rejected,
}

/// The lifecycle state of a booked session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Booked by the learner, awaiting teacher confirmation.
    Pending,
    /// Confirmed by the teacher.
    Confirmed,
    /// Held and completed; credits transferred.
    Completed,
    /// Cancelled by either party before completion.
    Cancelled,
    /// The meeting never happened.
    NoShow,
}

impl SessionStatus {
    /// Terminal states are retained for history and never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SessionStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(TypeError::UnknownSessionStatus(other.to_string())),
        }
    }
}

/// The kind of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Credits earned by teaching a completed session.
    Earned,
    /// Credits spent booking a session.
    Spent,
    /// Granted credits — signup grants and cancellation refunds.
    Bonus,
    /// Credits removed by an administrative penalty.
    Penalty,
    /// Credits granted by a subscription plan.
    Subscription,
}

/// Difficulty tier of an offering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}
