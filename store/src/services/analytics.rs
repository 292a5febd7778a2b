//! Analytics service
//!
//! Aggregates are a pure function of the current user and complaint
//! collections and are always recomputed with a full scan. The free
//! functions here do the math over in-memory snapshots; [`AnalyticsService`]
//! reads the repositories, persists the latest snapshot and serves cached
//! copies.

use crate::clock::Clock;
use crate::config::{
    ACTIVE_USER_WINDOW_DAYS, ANALYTICS_CACHE_KEY, MONTHLY_TREND_WINDOW, SINGLETON_ID,
};
use crate::database::models::{
    Analytics, Complaint, ComplaintStatus, MonthlyTrend, ResponseTimeStats, Role, User,
    UserStats, UsersByRole,
};
use crate::database::repository::{ComplaintRepository, UserRepository};
use crate::services::CacheService;
use crate::storage::{KvStore, StorageKey};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Count items by the string produced by `key`
pub fn group_by<T, K, F>(items: &[T], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> K,
    K: ToString,
{
    items.iter().fold(BTreeMap::new(), |mut acc, item| {
        *acc.entry(key(item).to_string()).or_insert(0) += 1;
        acc
    })
}

fn month_key(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Per-month totals of complaints by creation month, oldest first, limited
/// to the most recent twelve months that have data
pub fn monthly_trends(complaints: &[Complaint]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<String, MonthlyTrend> = BTreeMap::new();

    for complaint in complaints {
        let month = month_key(&complaint.created_at);
        let bucket = buckets.entry(month.clone()).or_insert_with(|| MonthlyTrend {
            month,
            count: 0,
            approved: 0,
            rejected: 0,
        });

        bucket.count += 1;
        match complaint.status {
            ComplaintStatus::Approved => bucket.approved += 1,
            ComplaintStatus::Rejected => bucket.rejected += 1,
            _ => {}
        }
    }

    let skip = buckets.len().saturating_sub(MONTHLY_TREND_WINDOW);
    buckets.into_values().skip(skip).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turnaround of reviewed complaints in hours.
///
/// The median is the upper-middle element for even counts, not the mean of
/// the two middle values.
pub fn response_time_stats(complaints: &[Complaint]) -> ResponseTimeStats {
    let mut hours: Vec<f64> = complaints
        .iter()
        .filter(|c| c.status.is_terminal())
        .map(Complaint::response_hours)
        .collect();

    if hours.is_empty() {
        return ResponseTimeStats::default();
    }

    hours.sort_by(|a, b| a.total_cmp(b));
    let average = hours.iter().sum::<f64>() / hours.len() as f64;

    ResponseTimeStats {
        average: round2(average),
        median: round2(hours[hours.len() / 2]),
        fastest: round2(hours[0]),
        slowest: round2(hours[hours.len() - 1]),
    }
}

/// A user is active if they filed a complaint within the activity window
fn is_active(user: &User, complaints: &[Complaint], now: DateTime<Utc>) -> bool {
    let cutoff = now - Duration::days(ACTIVE_USER_WINDOW_DAYS);
    complaints
        .iter()
        .any(|c| c.user_id == user.id && c.created_at > cutoff)
}

pub fn user_stats(users: &[User], complaints: &[Complaint], now: DateTime<Utc>) -> UserStats {
    let this_month = month_key(&now);

    let mut by_role = UsersByRole::default();
    for user in users {
        match user.role {
            Role::Citizen => by_role.citizen += 1,
            Role::Police => by_role.police += 1,
            Role::Admin => by_role.admin += 1,
        }
    }

    UserStats {
        total_users: users.len(),
        active_users: users
            .iter()
            .filter(|u| is_active(u, complaints, now))
            .count(),
        new_users_this_month: users
            .iter()
            .filter(|u| month_key(&u.created_at) == this_month)
            .count(),
        users_by_role: by_role,
    }
}

/// Full snapshot over the given collections
pub fn compute_analytics(
    users: &[User],
    complaints: &[Complaint],
    now: DateTime<Utc>,
    created_at: DateTime<Utc>,
) -> Analytics {
    Analytics {
        id: SINGLETON_ID.to_string(),
        total_complaints: complaints.len(),
        complaints_by_status: group_by(complaints, |c| c.status),
        complaints_by_category: group_by(complaints, |c| c.category.clone()),
        complaints_by_priority: group_by(complaints, |c| c.priority),
        monthly_trends: monthly_trends(complaints),
        user_stats: user_stats(users, complaints, now),
        response_time_stats: response_time_stats(complaints),
        created_at,
        updated_at: now,
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: KvStore,
    clock: Arc<dyn Clock>,
    users: UserRepository,
    complaints: ComplaintRepository,
    cache: CacheService,
}

impl AnalyticsService {
    pub fn new(
        store: KvStore,
        clock: Arc<dyn Clock>,
        users: UserRepository,
        complaints: ComplaintRepository,
        cache: CacheService,
    ) -> Self {
        Self {
            store,
            clock,
            users,
            complaints,
            cache,
        }
    }

    /// Fresh snapshot of the current collections. Nothing is persisted.
    pub async fn compute(&self) -> Analytics {
        let users = self.users.get_all().await;
        let complaints = self.complaints.get_all().await;
        let now = self.clock.now();
        let created_at = self.get().await.map(|a| a.created_at).unwrap_or(now);

        compute_analytics(&users, &complaints, now, created_at)
    }

    /// Last persisted snapshot
    pub async fn get(&self) -> Option<Analytics> {
        self.store.get(StorageKey::Analytics).await
    }

    /// Recompute and persist the snapshot, keeping the original `created_at`
    pub async fn refresh(&self) -> bool {
        let analytics = self.compute().await;
        tracing::info!(
            "Refreshed analytics: {} complaints, {} users",
            analytics.total_complaints,
            analytics.user_stats.total_users
        );
        self.store.set(StorageKey::Analytics, &analytics).await
    }

    /// Snapshot served from the cache when one is live, otherwise computed
    /// and cached with the default TTL
    pub async fn cached(&self) -> Analytics {
        if let Some(analytics) = self.cache.get::<Analytics>(ANALYTICS_CACHE_KEY).await {
            tracing::debug!("Serving analytics from cache");
            return analytics;
        }

        let analytics = self.compute().await;
        self.cache.set(ANALYTICS_CACHE_KEY, &analytics).await;
        analytics
    }
}
