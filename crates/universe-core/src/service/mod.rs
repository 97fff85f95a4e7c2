//! REST resource services.
//!
//! Thin typed wrappers over the request gate, one per backend resource. They
//! hold no state of their own; session-affecting results (profile changes,
//! unread counters) are written back through the session manager.

pub mod admin;
pub mod communities;
pub mod notifications;
pub mod posts;
pub mod server;
pub mod theme;
pub mod users;

pub use admin::AdminService;
pub use communities::CommunityService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use server::{ServerService, ServerStatus};
pub use theme::ThemeService;
pub use users::UserService;
