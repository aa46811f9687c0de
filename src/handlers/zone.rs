//! Territory handlers: zones, membership, area mapping and coverage.

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::handlers::{serve, HandlerContext};
use crate::services::coverage;
use crate::types::{
    ActiveHeadRequest, AllZonesCoverageRequest, AssignZoneMemberRequest, CreateAreaRequest,
    CreateGovernorateRequest, CreateZoneRequest, GetZoneRequest, ListResponse, ListZonesRequest,
    MapZoneAreaRequest, RemoveZoneMemberRequest, UpdateZoneRequest, ZoneCoverageRequest,
    ZoneTeamRequest,
};

pub async fn handle_governorate_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.governorate.create",
        "zones:write",
        |ctx, _auth, payload: CreateGovernorateRequest| async move {
            queries::zone::create_governorate(&ctx.pool, &payload.name).await
        },
    )
    .await
}

pub async fn handle_area_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.area.create",
        "zones:write",
        |ctx, _auth, payload: CreateAreaRequest| async move {
            queries::zone::create_area(&ctx.pool, &payload.name, payload.governorate_id).await
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
        "orbis.zone.create",
        "zones:write",
        |ctx, _auth, payload: CreateZoneRequest| async move {
            queries::zone::create_zone(&ctx.pool, payload).await
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
        "orbis.zone.get",
        "zones:read",
        |ctx, _auth, payload: GetZoneRequest| async move {
            queries::zone::get_zone(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    crate::error::WorkerError::not_found(format!("zone {} not found", payload.id))
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
        "orbis.zone.list",
        "zones:read",
        |ctx, _auth, payload: ListZonesRequest| async move {
            let items = queries::zone::list_zones(&ctx.pool, payload).await?;
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
        "orbis.zone.update",
        "zones:write",
        |ctx, _auth, payload: UpdateZoneRequest| async move {
            queries::zone::update_zone(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_member_assign(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.member.assign",
        "zones:write",
        |ctx, _auth, payload: AssignZoneMemberRequest| async move {
            queries::zone::assign_member(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_member_remove(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.member.remove",
        "zones:write",
        |ctx, _auth, payload: RemoveZoneMemberRequest| async move {
            queries::zone::remove_member(&ctx.pool, payload.zone_id, payload.employee_id).await
        },
    )
    .await
}

pub async fn handle_team(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.team",
        "zones:read",
        |ctx, _auth, payload: ZoneTeamRequest| async move {
            let items = queries::zone::list_team(&ctx.pool, payload.zone_id).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_area_map(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.area.map",
        "zones:write",
        |ctx, _auth, payload: MapZoneAreaRequest| async move {
            queries::zone::map_area(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_area_unmap(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.area.unmap",
        "zones:write",
        |ctx, _auth, payload: MapZoneAreaRequest| async move {
            let removed =
                queries::zone::unmap_area(&ctx.pool, payload.zone_id, payload.area_id).await?;
            if !removed {
                return Err(crate::error::WorkerError::not_found(
                    "no active mapping between that zone and area",
                ));
            }
            Ok(serde_json::json!({ "removed": true }))
        },
    )
    .await
}

pub async fn handle_active_head(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.head.active",
        "zones:read",
        |ctx, _auth, payload: ActiveHeadRequest| async move {
            coverage::get_active_zone_head(&ctx.pool, payload.zone_id, payload.date).await
        },
    )
    .await
}

pub async fn handle_coverage(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.coverage",
        "zones:read",
        |ctx, _auth, payload: ZoneCoverageRequest| async move {
            coverage::get_zone_coverage_status(
                &ctx.pool,
                payload.zone_id,
                payload.start_date,
                payload.end_date,
            )
            .await
        },
    )
    .await
}

pub async fn handle_coverage_all(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.zone.coverage.all",
        "zones:read",
        |ctx, _auth, payload: AllZonesCoverageRequest| async move {
            coverage::get_all_zones_coverage_status(&ctx.pool, payload.date).await
        },
    )
    .await
}
