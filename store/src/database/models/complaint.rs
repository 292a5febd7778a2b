use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Review state of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::UnderReview => "under_review",
            ComplaintStatus::Approved => "approved",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected complaints receive no further transitions.
    ///
    /// Callers are expected to honor this; the store does not enforce it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplaintStatus::Approved | ComplaintStatus::Rejected)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filed crime report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    /// Owning user id; anonymous reports use [`crate::config::ANONYMOUS_USER_ID`]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    pub title: String,
    pub description: String,
    /// Free-form category key, e.g. "Theft/Burglary"
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crime_type: Option<String>,
    pub location: String,
    #[serde(default)]
    pub date_of_incident: String,
    #[serde(default)]
    pub time_of_incident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<String>,
    #[serde(default)]
    pub evidence_files: Vec<String>,
    pub status: ComplaintStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_officer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// New pending complaint with a random id, stamped at `now`
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            user_name: String::new(),
            user_email: String::new(),
            user_phone: None,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            crime_type: None,
            location: location.into(),
            date_of_incident: now.format("%Y-%m-%d").to_string(),
            time_of_incident: now.format("%H:%M:%S").to_string(),
            witnesses: None,
            evidence_files: Vec::new(),
            status: ComplaintStatus::Pending,
            priority,
            assigned_officer: None,
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hours between filing and the last update
    pub fn response_hours(&self) -> f64 {
        (self.updated_at - self.created_at).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Partial update for a [`Complaint`]; `None` fields are left untouched.
///
/// Optional text fields take `Some(None)` to clear them. Applying any
/// update stamps `updated_at`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub crime_type: Option<Option<String>>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub witnesses: Option<Option<String>>,
    pub evidence_files: Option<Vec<String>>,
    pub status: Option<ComplaintStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub assigned_officer: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub review_notes: Option<Option<String>>,
}

impl ComplaintUpdate {
    pub fn status(status: ComplaintStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub(crate) fn apply_to(self, complaint: &mut Complaint, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            complaint.title = title;
        }
        if let Some(description) = self.description {
            complaint.description = description;
        }
        if let Some(category) = self.category {
            complaint.category = category;
        }
        if let Some(crime_type) = self.crime_type {
            complaint.crime_type = crime_type;
        }
        if let Some(location) = self.location {
            complaint.location = location;
        }
        if let Some(witnesses) = self.witnesses {
            complaint.witnesses = witnesses;
        }
        if let Some(files) = self.evidence_files {
            complaint.evidence_files = files;
        }
        if let Some(status) = self.status {
            complaint.status = status;
        }
        if let Some(priority) = self.priority {
            complaint.priority = priority;
        }
        if let Some(assigned_officer) = self.assigned_officer {
            complaint.assigned_officer = assigned_officer;
        }
        if let Some(review_notes) = self.review_notes {
            complaint.review_notes = review_notes;
        }
        complaint.updated_at = now;
    }
}

/// Dashboard filter over complaints.
///
/// `search` matches case-insensitively against title, description, id and
/// filer name. Unset filters match everything.
#[derive(Debug, Clone, Default)]
pub struct ComplaintQuery {
    pub search: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub priority: Option<Priority>,
}

impl ComplaintQuery {
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = complaint.title.to_lowercase().contains(&term)
                || complaint.description.to_lowercase().contains(&term)
                || complaint.id.to_lowercase().contains(&term)
                || complaint.user_name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }

        if self.priority.is_some_and(|p| p != complaint.priority) {
            return false;
        }

        true
    }
}
