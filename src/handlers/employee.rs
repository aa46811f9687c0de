//! Department and employee handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::handlers::{serve, HandlerContext};
use crate::types::{
    CreateDepartmentRequest, CreateEmployeeRequest, EmptyPayload, GetEmployeeRequest,
    ListEmployeesRequest, ListResponse, UpdateEmployeeRequest,
};

pub async fn handle_department_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.department.create",
        "employees:write",
        |ctx, _auth, payload: CreateDepartmentRequest| async move {
            queries::employee::create_department(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_department_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.department.list",
        "employees:read",
        |ctx, _auth, _payload: EmptyPayload| async move {
            let items = queries::employee::list_departments(&ctx.pool).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.employee.create",
        "employees:write",
        |ctx, _auth, payload: CreateEmployeeRequest| async move {
            queries::employee::create_employee(&ctx.pool, payload).await
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
        "orbis.employee.get",
        "employees:read",
        |ctx, _auth, payload: GetEmployeeRequest| async move {
            queries::employee::get_employee(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    crate::error::WorkerError::not_found(format!(
                        "employee {} not found",
                        payload.id
                    ))
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
        "orbis.employee.list",
        "employees:read",
        |ctx, _auth, payload: ListEmployeesRequest| async move {
            let items = queries::employee::list_employees(&ctx.pool, payload).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_update(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.employee.update",
        "employees:write",
        |ctx, _auth, payload: UpdateEmployeeRequest| async move {
            queries::employee::update_employee(&ctx.pool, payload).await
        },
    )
    .await
}
