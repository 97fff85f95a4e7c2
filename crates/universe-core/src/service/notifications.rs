//! Social notifications, announcements and the unread counters.

use serde_json::json;
use tracing::debug;
use universe_types::error::GateError;
use universe_types::notification::{
    Announcement, NewAnnouncement, Notification, NotificationCounters, NotificationStatus,
};

use crate::gate::RequestGate;
use crate::session::manager::NOTIFICATION_STATUS_PATH;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

pub const NOTIFICATIONS_PATH: &str = "/api/notifications/";
pub const NOTIFICATIONS_READ_PATH: &str = "/api/notifications/mark-read/";
pub const ANNOUNCEMENTS_PATH: &str = "/api/announcements/";
pub const ANNOUNCEMENTS_CREATE_PATH: &str = "/api/announcements/create/";
pub const ANNOUNCEMENTS_READ_PATH: &str = "/api/announcements/mark-read/";

pub struct NotificationService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> NotificationService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, GateError> {
        self.gate.get_json(NOTIFICATIONS_PATH).await
    }

    /// Mark every social notification read, then poll the unread counters.
    pub async fn mark_notifications_read(&self) -> Result<(), GateError> {
        self.gate.post(NOTIFICATIONS_READ_PATH, json!({})).await?;
        self.refresh_counters().await.map(|_| ())
    }

    /// Announcements targeted at the current user.
    pub async fn announcements(&self) -> Result<Vec<Announcement>, GateError> {
        self.gate.get_json(ANNOUNCEMENTS_PATH).await
    }

    /// Mark the given announcements read. An empty list sends nothing.
    pub async fn mark_announcements_read(&self, ids: &[i64]) -> Result<(), GateError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.gate
            .post(ANNOUNCEMENTS_READ_PATH, json!({ "ids": ids }))
            .await?;
        self.refresh_counters().await.map(|_| ())
    }

    /// Publish an announcement. Requires the send-announcement capability;
    /// the backend answers 403 otherwise.
    pub async fn create_announcement(&self, announcement: &NewAnnouncement) -> Result<Announcement, GateError> {
        self.gate
            .post_json(ANNOUNCEMENTS_CREATE_PATH, announcement)
            .await
    }

    /// Fetch the unread counters and install them in the session.
    pub async fn refresh_counters(&self) -> Result<NotificationCounters, GateError> {
        let status: NotificationStatus = self.gate.get_json(NOTIFICATION_STATUS_PATH).await?;
        let counters = NotificationCounters::from(status);
        debug!(
            announcements = counters.announcements,
            social = counters.social,
            "unread counters refreshed"
        );
        self.gate.session().set_notification_counters(counters).await;
        Ok(counters)
    }
}
