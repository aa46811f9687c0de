//! Service request handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::error::WorkerError;
use crate::handlers::{serve, HandlerContext};
use crate::services::assignment;
use crate::types::{
    AssignServiceRequestRequest, CreateServiceRequestRequest, GetServiceRequestRequest,
    ListResponse, ListServiceRequestsRequest, UpdateServiceRequestStatusRequest,
};

pub async fn handle_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.service-request.create",
        "service-requests:write",
        |ctx, _auth, payload: CreateServiceRequestRequest| async move {
            assignment::create_service_request(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_get(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.service-request.get",
        "service-requests:read",
        |ctx, _auth, payload: GetServiceRequestRequest| async move {
            queries::service_request::get_service_request(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    WorkerError::not_found(format!("service request {} not found", payload.id))
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
        "orbis.service-request.list",
        "service-requests:read",
        |ctx, _auth, payload: ListServiceRequestsRequest| async move {
            let items =
                queries::service_request::list_service_requests(&ctx.pool, payload).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_status_update(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.service-request.status.update",
        "service-requests:write",
        |ctx, auth, payload: UpdateServiceRequestStatusRequest| async move {
            queries::service_request::update_status(
                &ctx.pool,
                payload.id,
                payload.status,
                payload.note.as_deref(),
                Some(auth.user_id),
            )
            .await
        },
    )
    .await
}

pub async fn handle_assign(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.service-request.assign",
        "service-requests:write",
        |ctx, auth, payload: AssignServiceRequestRequest| async move {
            queries::service_request::assign(
                &ctx.pool,
                payload.id,
                payload.employee_id,
                payload.note.as_deref(),
                Some(auth.user_id),
            )
            .await
        },
    )
    .await
}

pub async fn handle_timeline(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.service-request.timeline",
        "service-requests:read",
        |ctx, _auth, payload: GetServiceRequestRequest| async move {
            let items = queries::service_request::list_timeline(&ctx.pool, payload.id).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}
