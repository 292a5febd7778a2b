//! Store entities
//!
//! Rust structs for every persisted record. All models serialize with
//! camelCase field names so stored and exported JSON keeps one shape.

pub mod analytics;
pub mod audit;
pub mod cache;
pub mod complaint;
pub mod de;
pub mod notification;
pub mod settings;
pub mod user;

pub use analytics::*;
pub use audit::*;
pub use cache::*;
pub use complaint::*;
pub use notification::*;
pub use settings::*;
pub use user::*;
