//! Health-check handler. Unauthenticated by design: it proves the worker
//! is subscribed and the database pool is alive.

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::handlers::HandlerContext;
use crate::types::{EmptyPayload, Request, SuccessResponse};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pong {
    message: &'static str,
    database: bool,
}

pub async fn handle_ping(
    client: Client,
    mut subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Ping without reply subject");
                continue;
            }
        };

        let request_id = serde_json::from_slice::<Request<EmptyPayload>>(&msg.payload)
            .map(|r| r.id)
            .unwrap_or_else(|_| Uuid::nil());

        let database = sqlx::query("SELECT 1")
            .execute(&ctx.pool)
            .await
            .is_ok();

        let response = SuccessResponse::new(
            request_id,
            Pong {
                message: "pong",
                database,
            },
        );
        let _ = client
            .publish(reply, serde_json::to_vec(&response)?.into())
            .await;
    }

    Ok(())
}
