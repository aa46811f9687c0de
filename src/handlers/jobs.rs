//! Scheduled job handlers: manual triggering, job listing, and queueing
//! of one-off notifications.

use anyhow::Result;
use async_nats::{Client, Subscriber};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::error::WorkerError;
use crate::handlers::{serve, HandlerContext};
use crate::types::{EmptyPayload, ScheduleNotificationRequest};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerJobRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerJobResponse {
    pub name: String,
    pub outcome: String,
}

/// Fire a registered job immediately, outside its schedule.
pub async fn handle_trigger(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.jobs.trigger",
        "jobs:trigger",
        |ctx, _auth, payload: TriggerJobRequest| async move {
            let outcome = ctx
                .scheduler
                .trigger(&payload.name)
                .await
                .map_err(|e| WorkerError::validation(e.to_string()))?;
            Ok(TriggerJobResponse {
                name: payload.name,
                outcome,
            })
        },
    )
    .await
}

pub async fn handle_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.jobs.list",
        "jobs:trigger",
        |ctx, _auth, _payload: EmptyPayload| async move {
            let names: Vec<String> = ctx
                .scheduler
                .job_names()
                .into_iter()
                .map(String::from)
                .collect();
            Ok(serde_json::json!({ "jobs": names }))
        },
    )
    .await
}

pub async fn handle_notification_schedule(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.notification.schedule",
        "notifications:write",
        |ctx, _auth, payload: ScheduleNotificationRequest| async move {
            queries::employee::get_active_employee(&ctx.pool, payload.recipient_id).await?;
            queries::notification::schedule(&ctx.pool, payload).await
        },
    )
    .await
}
