//! Customer, property, unit and complaint-type handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::handlers::{serve, HandlerContext};
use crate::types::{
    CreateComplaintTypeRequest, CreateCustomerRequest, CreatePropertyRequest, CreateUnitRequest,
    EmptyPayload, ListResponse,
};

pub async fn handle_customer_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.customer.create",
        "customers:write",
        |ctx, _auth, payload: CreateCustomerRequest| async move {
            queries::customer::create_customer(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_property_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.property.create",
        "customers:write",
        |ctx, _auth, payload: CreatePropertyRequest| async move {
            queries::customer::create_property(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_unit_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.unit.create",
        "customers:write",
        |ctx, _auth, payload: CreateUnitRequest| async move {
            queries::customer::create_unit(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_complaint_type_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.complaint-type.create",
        "service-requests:write",
        |ctx, _auth, payload: CreateComplaintTypeRequest| async move {
            queries::customer::create_complaint_type(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_complaint_type_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.complaint-type.list",
        "service-requests:read",
        |ctx, _auth, _payload: EmptyPayload| async move {
            let items = queries::customer::list_complaint_types(&ctx.pool).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}
