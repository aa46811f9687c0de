//! Leave handlers: types, request lifecycle, balances.
//!
//! Approve/reject record the authenticated caller as the approver.

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::error::WorkerError;
use crate::handlers::{serve, HandlerContext};
use crate::types::{
    ApproveLeaveRequest, CancelLeaveRequest, CreateLeaveRequestRequest, CreateLeaveTypeRequest,
    EmptyPayload, GetLeaveBalancesRequest, GetLeaveRequestRequest, ListLeaveRequestsRequest,
    ListResponse, RejectLeaveRequest, UpdateLeaveRequestRequest, UpdateLeaveTypeRequest,
};

pub async fn handle_type_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.type.create",
        "leaves:manage",
        |ctx, _auth, payload: CreateLeaveTypeRequest| async move {
            queries::leave_type::create_leave_type(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_type_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.type.list",
        "leaves:read",
        |ctx, _auth, _payload: EmptyPayload| async move {
            let items = queries::leave_type::list_leave_types(&ctx.pool).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_type_update(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.type.update",
        "leaves:manage",
        |ctx, _auth, payload: UpdateLeaveTypeRequest| async move {
            queries::leave_type::update_leave_type(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_request_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.create",
        "leaves:write",
        |ctx, _auth, payload: CreateLeaveRequestRequest| async move {
            queries::leave_request::create_leave_request(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_request_get(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.get",
        "leaves:read",
        |ctx, _auth, payload: GetLeaveRequestRequest| async move {
            queries::leave_request::get_leave_request(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    WorkerError::not_found(format!("leave request {} not found", payload.id))
                })
        },
    )
    .await
}

pub async fn handle_request_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.list",
        "leaves:read",
        |ctx, _auth, payload: ListLeaveRequestsRequest| async move {
            let items = queries::leave_request::list_leave_requests(&ctx.pool, payload).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_request_update(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.update",
        "leaves:write",
        |ctx, _auth, payload: UpdateLeaveRequestRequest| async move {
            queries::leave_request::update_leave_request(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_request_approve(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.approve",
        "leaves:approve",
        |ctx, auth, payload: ApproveLeaveRequest| async move {
            queries::leave_request::approve_leave_request(&ctx.pool, payload.id, auth.user_id)
                .await
        },
    )
    .await
}

pub async fn handle_request_reject(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.reject",
        "leaves:approve",
        |ctx, auth, payload: RejectLeaveRequest| async move {
            queries::leave_request::reject_leave_request(
                &ctx.pool,
                payload.id,
                auth.user_id,
                &payload.rejection_reason,
            )
            .await
        },
    )
    .await
}

pub async fn handle_request_cancel(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.request.cancel",
        "leaves:write",
        |ctx, _auth, payload: CancelLeaveRequest| async move {
            queries::leave_request::cancel_leave_request(&ctx.pool, payload.id).await
        },
    )
    .await
}

pub async fn handle_balance_get(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.leave.balance.get",
        "leaves:read",
        |ctx, _auth, payload: GetLeaveBalancesRequest| async move {
            let items =
                queries::leave_balance::get_balances(&ctx.pool, payload.employee_id, payload.year)
                    .await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}
