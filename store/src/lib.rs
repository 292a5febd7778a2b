//! CrimeWatch store library
//!
//! Local persistence and analytics for the CrimeWatch report system: user
//! and complaint repositories over a key-value medium, a TTL cache, the
//! audit log, notifications, system settings, aggregate analytics and JSON
//! export/import.

pub mod app;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;

pub use app::DataStore;
