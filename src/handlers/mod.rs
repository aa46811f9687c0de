//! NATS message handlers.
//!
//! Every operation is a request-reply subject under the `orbis.` prefix.
//! `serve` owns the shared loop: parse the envelope, authorize against
//! one permission string, run the operation, reply with the success or
//! error envelope. Handler modules contribute the operation closures.

pub mod amc;
pub mod customer;
pub mod employee;
pub mod jobs;
pub mod leave;
pub mod ping;
pub mod service_request;
pub mod zone;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{self, AuthConfig, AuthInfo};
use crate::config::Config;
use crate::error::{WorkerError, WorkerResult};
use crate::services::scheduler::Scheduler;
use crate::types::{ErrorResponse, Request, SuccessResponse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    pub pool: PgPool,
    pub auth: Arc<AuthConfig>,
    pub scheduler: Arc<Scheduler>,
}

/// Request-reply loop shared by all subjects.
///
/// `permission` is the single `resource:action` string the caller must
/// hold. The operation receives the context, the authenticated caller,
/// and the parsed payload.
pub async fn serve<T, R, F, Fut>(
    client: Client,
    mut subscriber: Subscriber,
    ctx: HandlerContext,
    subject: &'static str,
    permission: &'static str,
    operation: F,
) -> Result<()>
where
    T: DeserializeOwned + Send,
    R: Serialize,
    F: Fn(HandlerContext, AuthInfo, T) -> Fut,
    Fut: Future<Output = WorkerResult<R>>,
{
    while let Some(msg) = subscriber.next().await {
        debug!(subject, "Received message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!(subject, "Message without reply subject");
                continue;
            }
        };

        let request: Request<T> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!(subject, "Failed to parse request: {e}");
                let response = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&response)?.into())
                    .await;
                continue;
            }
        };

        let auth = match auth::authorize(&request, permission, &ctx.auth) {
            Ok(auth) => auth,
            Err(err) => {
                let response = ErrorResponse::from_error(request.id, &err);
                let _ = client
                    .publish(reply, serde_json::to_vec(&response)?.into())
                    .await;
                continue;
            }
        };

        match operation(ctx.clone(), auth, request.payload).await {
            Ok(payload) => {
                let response = SuccessResponse::new(request.id, payload);
                let _ = client
                    .publish(reply, serde_json::to_vec(&response)?.into())
                    .await;
            }
            Err(err) => {
                if let WorkerError::Database(ref source) = err {
                    error!(subject, "Database error: {source}");
                }
                let response = ErrorResponse::from_error(request.id, &err);
                let _ = client
                    .publish(reply, serde_json::to_vec(&response)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

macro_rules! spawn_subject {
    ($handles:ident, $client:expr, $ctx:expr, $subject:literal, $handler:path) => {{
        let subscriber = $client.subscribe($subject).await?;
        let client = $client.clone();
        let ctx = $ctx.clone();
        $handles.push(tokio::spawn(async move {
            $handler(client, subscriber, ctx).await
        }));
    }};
}

/// Subscribe every subject and run the handler tasks until one fails.
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let scheduler = crate::build_scheduler(pool.clone());
    scheduler.start();

    let ctx = HandlerContext {
        pool,
        auth: Arc::new(AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            service_api_key: config.service_api_key.clone(),
        }),
        scheduler,
    };

    let mut handles: Vec<tokio::task::JoinHandle<Result<()>>> = Vec::new();

    spawn_subject!(handles, client, ctx, "orbis.ping", ping::handle_ping);

    // Directory
    spawn_subject!(handles, client, ctx, "orbis.department.create", employee::handle_department_create);
    spawn_subject!(handles, client, ctx, "orbis.department.list", employee::handle_department_list);
    spawn_subject!(handles, client, ctx, "orbis.employee.create", employee::handle_create);
    spawn_subject!(handles, client, ctx, "orbis.employee.get", employee::handle_get);
    spawn_subject!(handles, client, ctx, "orbis.employee.list", employee::handle_list);
    spawn_subject!(handles, client, ctx, "orbis.employee.update", employee::handle_update);
    spawn_subject!(handles, client, ctx, "orbis.customer.create", customer::handle_customer_create);
    spawn_subject!(handles, client, ctx, "orbis.property.create", customer::handle_property_create);
    spawn_subject!(handles, client, ctx, "orbis.unit.create", customer::handle_unit_create);
    spawn_subject!(handles, client, ctx, "orbis.complaint-type.create", customer::handle_complaint_type_create);
    spawn_subject!(handles, client, ctx, "orbis.complaint-type.list", customer::handle_complaint_type_list);

    // Territory
    spawn_subject!(handles, client, ctx, "orbis.governorate.create", zone::handle_governorate_create);
    spawn_subject!(handles, client, ctx, "orbis.area.create", zone::handle_area_create);
    spawn_subject!(handles, client, ctx, "orbis.zone.create", zone::handle_create);
    spawn_subject!(handles, client, ctx, "orbis.zone.get", zone::handle_get);
    spawn_subject!(handles, client, ctx, "orbis.zone.list", zone::handle_list);
    spawn_subject!(handles, client, ctx, "orbis.zone.update", zone::handle_update);
    spawn_subject!(handles, client, ctx, "orbis.zone.member.assign", zone::handle_member_assign);
    spawn_subject!(handles, client, ctx, "orbis.zone.member.remove", zone::handle_member_remove);
    spawn_subject!(handles, client, ctx, "orbis.zone.team", zone::handle_team);
    spawn_subject!(handles, client, ctx, "orbis.zone.area.map", zone::handle_area_map);
    spawn_subject!(handles, client, ctx, "orbis.zone.area.unmap", zone::handle_area_unmap);
    spawn_subject!(handles, client, ctx, "orbis.zone.head.active", zone::handle_active_head);
    spawn_subject!(handles, client, ctx, "orbis.zone.coverage", zone::handle_coverage);
    spawn_subject!(handles, client, ctx, "orbis.zone.coverage.all", zone::handle_coverage_all);

    // Leave
    spawn_subject!(handles, client, ctx, "orbis.leave.type.create", leave::handle_type_create);
    spawn_subject!(handles, client, ctx, "orbis.leave.type.list", leave::handle_type_list);
    spawn_subject!(handles, client, ctx, "orbis.leave.type.update", leave::handle_type_update);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.create", leave::handle_request_create);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.get", leave::handle_request_get);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.list", leave::handle_request_list);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.update", leave::handle_request_update);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.approve", leave::handle_request_approve);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.reject", leave::handle_request_reject);
    spawn_subject!(handles, client, ctx, "orbis.leave.request.cancel", leave::handle_request_cancel);
    spawn_subject!(handles, client, ctx, "orbis.leave.balance.get", leave::handle_balance_get);

    // Service requests
    spawn_subject!(handles, client, ctx, "orbis.service-request.create", service_request::handle_create);
    spawn_subject!(handles, client, ctx, "orbis.service-request.get", service_request::handle_get);
    spawn_subject!(handles, client, ctx, "orbis.service-request.list", service_request::handle_list);
    spawn_subject!(handles, client, ctx, "orbis.service-request.status.update", service_request::handle_status_update);
    spawn_subject!(handles, client, ctx, "orbis.service-request.assign", service_request::handle_assign);
    spawn_subject!(handles, client, ctx, "orbis.service-request.timeline", service_request::handle_timeline);

    // AMC contracts
    spawn_subject!(handles, client, ctx, "orbis.amc.contract.create", amc::handle_contract_create);
    spawn_subject!(handles, client, ctx, "orbis.amc.contract.get", amc::handle_contract_get);
    spawn_subject!(handles, client, ctx, "orbis.amc.contract.list", amc::handle_contract_list);
    spawn_subject!(handles, client, ctx, "orbis.amc.contract.activate", amc::handle_contract_activate);
    spawn_subject!(handles, client, ctx, "orbis.amc.contract.cancel", amc::handle_contract_cancel);
    spawn_subject!(handles, client, ctx, "orbis.amc.schedule.generate", amc::handle_schedule_generate);
    spawn_subject!(handles, client, ctx, "orbis.amc.payment.generate", amc::handle_payment_generate);
    spawn_subject!(handles, client, ctx, "orbis.amc.payment.record", amc::handle_payment_record);

    // Jobs and notifications
    spawn_subject!(handles, client, ctx, "orbis.jobs.trigger", jobs::handle_trigger);
    spawn_subject!(handles, client, ctx, "orbis.jobs.list", jobs::handle_list);
    spawn_subject!(handles, client, ctx, "orbis.notification.schedule", jobs::handle_notification_schedule);

    info!("All handlers started ({} subjects)", handles.len());

    // Handlers run until the process stops; surface the first failure.
    for handle in handles {
        handle.await??;
    }

    Ok(())
}
