//! Services module
//!
//! Store components built on the key-value adapter: cache, audit log,
//! notifications, settings, analytics, and export/import.

pub mod analytics;
pub mod audit;
pub mod backup;
pub mod cache;
pub mod notifications;
pub mod settings;

pub use analytics::AnalyticsService;
pub use audit::AuditLogService;
pub use backup::{BackupService, DataExport, IntegrityReport};
pub use cache::CacheService;
pub use notifications::NotificationsService;
pub use settings::SettingsService;

use crate::clock::Clock;
use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// `<prefix>_<epochMillis>_<9 base36 chars>`
pub(crate) fn generate_id(prefix: &str, clock: &dyn Clock) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}_{}_{}", prefix, clock.now_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_generate_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(at);

        let id = generate_id("audit", &clock);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "audit");
        assert_eq!(parts[1], at.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }
}
