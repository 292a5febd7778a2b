use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts for one `YYYY-MM` bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub count: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsersByRole {
    pub citizen: usize,
    pub police: usize,
    pub admin: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub active_users: usize,
    pub new_users_this_month: usize,
    #[serde(default)]
    pub users_by_role: UsersByRole,
}

/// Review turnaround in hours, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub average: f64,
    pub median: f64,
    pub fastest: f64,
    pub slowest: f64,
}

/// Aggregate snapshot over all users and complaints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub id: String,
    pub total_complaints: usize,
    pub complaints_by_status: BTreeMap<String, usize>,
    pub complaints_by_category: BTreeMap<String, usize>,
    pub complaints_by_priority: BTreeMap<String, usize>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub user_stats: UserStats,
    pub response_time_stats: ResponseTimeStats,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Analytics {
    /// Share of complaints in a terminal status, as a whole percentage
    pub fn resolution_rate(&self) -> u32 {
        if self.total_complaints == 0 {
            return 0;
        }
        let resolved = self.complaints_by_status.get("approved").copied().unwrap_or(0)
            + self.complaints_by_status.get("rejected").copied().unwrap_or(0);
        ((resolved as f64 / self.total_complaints as f64) * 100.0).round() as u32
    }
}
