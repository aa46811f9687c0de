//! Scheduled notification queries

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::WorkerResult;
use crate::types::{ScheduledNotification, ScheduleNotificationRequest};

const COLUMNS: &str = "id, recipient_id, subject, body, scheduled_for, status, sent_at, last_error, created_at";

pub async fn schedule(
    pool: &PgPool,
    request: ScheduleNotificationRequest,
) -> WorkerResult<ScheduledNotification> {
    let notification = sqlx::query_as::<_, ScheduledNotification>(&format!(
        r#"
        INSERT INTO scheduled_notifications (recipient_id, subject, body, scheduled_for)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(request.recipient_id)
    .bind(&request.subject)
    .bind(&request.body)
    .bind(request.scheduled_for)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

/// Pending notifications whose scheduled time has passed.
pub async fn due(
    pool: &PgPool,
    now: DateTime<Utc>,
    limit: i64,
) -> WorkerResult<Vec<ScheduledNotification>> {
    let notifications = sqlx::query_as::<_, ScheduledNotification>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM scheduled_notifications
        WHERE status = 'pending' AND scheduled_for <= $1
        ORDER BY scheduled_for ASC
        LIMIT $2
        "#
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_sent(pool: &PgPool, id: Uuid) -> WorkerResult<()> {
    sqlx::query(
        "UPDATE scheduled_notifications SET status = 'sent', sent_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn mark_failed(pool: &PgPool, id: Uuid, error: &str) -> WorkerResult<()> {
    sqlx::query(
        "UPDATE scheduled_notifications SET status = 'failed', last_error = $1 WHERE id = $2",
    )
    .bind(error)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
