//! Scheduled notification types for the dispatch job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Delivery status of a scheduled notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_status", rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

/// A notification queued for delivery at (or after) `scheduled_for`.
/// The dispatch job picks up due pending rows every few minutes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub subject: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
    pub status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleNotificationRequest {
    pub recipient_id: Uuid,
    pub subject: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&NotificationStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
