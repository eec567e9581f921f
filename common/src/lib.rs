//! A library with common utilities for the patent verification workflow.

pub mod agreement;
pub mod allocation;
pub mod csv_util;
#[cfg(feature = "database")]
pub mod db_util;
#[cfg(feature = "database")]
pub mod manager;
pub mod review_routing;
pub mod salary;
pub mod shard_split;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default team the one-shot commands operate on.
pub const DEFAULT_GROUP: &str = "group1";
/// Fraction of the next shard sampled for cross-review agreement checks.
pub const DEFAULT_CHECK_GAP: f64 = 0.2;
/// Patent-existence rates below this are reported as suspicious.
pub const LOW_EXISTENCE_RATE: f64 = 0.6;
/// Cross-review consistency rates below this are reported as suspicious.
pub const LOW_CONSISTENCY_RATE: f64 = 0.9;

/// Verdict written by reviewers when a patent exists.
pub const PATENT_PRESENT: &str = "yes";
/// Verdict written by reviewers when no patent was found.
pub const PATENT_ABSENT: &str = "no";
/// Placeholder for a name no reviewer has confirmed yet.
pub const NAME_UNKNOWN: &str = "unknown";
/// Placeholder publication number before review.
pub const PUBLICATION_NONE: &str = "none";

/// Review progress of a single candidate record.
///
/// The lifecycle only moves forward: unassigned records get assigned to a
/// reviewer, completed by them, and finally validated by a second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordStatus {
    Unassigned,
    Assigned,
    Completed,
    Validated,
}

impl RecordStatus {
    /// The integer code stored in the database.
    pub fn code(self) -> i32 {
        match self {
            Self::Unassigned => 0,
            Self::Assigned => 1,
            Self::Completed => 2,
            Self::Validated => 3,
        }
    }

    /// Decode a stored status code.
    ///
    /// # Errors
    /// Returns an error for codes outside the known range.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Unassigned),
            1 => Ok(Self::Assigned),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Validated),
            other => bail!("unknown record status code: {other}"),
        }
    }

    /// Whether moving to `next` is a legal (forward) transition.
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }

    /// Advance to `next`, rejecting backward and same-state moves.
    ///
    /// # Errors
    /// Returns an error if the transition is not a forward move.
    pub fn advance_to(self, next: Self) -> Result<Self> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            bail!("illegal status transition: {self} -> {next}")
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Validated => "validated",
        };
        write!(f, "{label}")
    }
}

/// A patent-name-matching candidate row, as stored and as exported to CSV.
///
/// The same shape round-trips through allocation exports, reviewer
/// submissions and the final merge, so the CSV column set is the struct
/// field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "id", default)]
    pub record_id: u32,
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub preprocessed_name: String,
    #[serde(default)]
    pub key_name: String,
    #[serde(default)]
    pub have_patent: String,
    pub now_name: String,
    pub have_patent_fixed: String,
    pub patent_publication_number: String,
}

/// Team member roles recognized by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Deputy,
    Leader,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Deputy => "deputy",
            Self::Leader => "leader",
        }
    }

    /// Parse a stored role label.
    ///
    /// # Errors
    /// Returns an error for labels that are not `member`/`deputy`/`leader`.
    pub fn parse(label: &str) -> Result<Self> {
        match label {
            "member" => Ok(Self::Member),
            "deputy" => Ok(Self::Deputy),
            "leader" => Ok(Self::Leader),
            other => bail!("unknown team role: {other}"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One roster line: a member of a group acting in a role.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub group: String,
    pub role: Role,
    pub member: String,
}

/// The members of a single group, bucketed by role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterGroup {
    pub members: Vec<String>,
    pub deputy: Vec<String>,
    pub leader: Vec<String>,
}

impl RosterGroup {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.deputy.is_empty() && self.leader.is_empty()
    }
}

/// Static team configuration passed to the task manager at construction.
/// Seeded into the store once and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    entries: Vec<RosterEntry>,
}

impl TeamRoster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// The stock two-group roster used when no custom roster is supplied.
    pub fn default_teams() -> Self {
        let mut entries = Vec::new();
        for (group, suffix) in [("group1", "g1"), ("group2", "g2")] {
            for i in 1..=2 {
                entries.push(RosterEntry {
                    group: group.to_string(),
                    role: Role::Member,
                    member: format!("member{i}_{suffix}"),
                });
            }
            entries.push(RosterEntry {
                group: group.to_string(),
                role: Role::Deputy,
                member: format!("deputy_{suffix}"),
            });
            entries.push(RosterEntry {
                group: group.to_string(),
                role: Role::Leader,
                member: format!("leader_{suffix}"),
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Group names in first-seen order.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.group) {
                names.push(entry.group.clone());
            }
        }
        names
    }

    /// The roster bucketed by role for one group, if the group exists.
    pub fn group(&self, name: &str) -> Option<RosterGroup> {
        let mut group = RosterGroup::default();
        let mut found = false;
        for entry in self.entries.iter().filter(|e| e.group == name) {
            found = true;
            match entry.role {
                Role::Member => group.members.push(entry.member.clone()),
                Role::Deputy => group.deputy.push(entry.member.clone()),
                Role::Leader => group.leader.push(entry.member.clone()),
            }
        }
        found.then_some(group)
    }
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self::default_teams()
    }
}
