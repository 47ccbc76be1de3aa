//! Administrator view models

use super::entry::WorkEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user known to the service, with their entry count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub entry_count: u64,
    /// Earliest stored entry or credential of the user
    pub first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    /// Entries across every user, administrators included
    pub total_entries: u64,
}

/// User listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub success: bool,
    pub users: Vec<UserSummary>,
    pub stats: AdminStats,
}

/// One user's entries, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntries {
    pub success: bool,
    pub user_id: String,
    pub entries: Vec<WorkEntry>,
}
