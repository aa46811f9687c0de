//! Zone, membership and area-mapping queries.
//!
//! Headship is derived from `zone_members` rows. Assigning a head role
//! demotes the previous active holder inside the same transaction so the
//! one-active-head-per-role partial indexes are never violated.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    Area, AssignZoneMemberRequest, CreateZoneRequest, Employee, Governorate, ListZonesRequest,
    MapZoneAreaRequest, UpdateZoneRequest, Zone, ZoneArea, ZoneMember, ZoneMemberWithEmployee,
    ZoneRole,
};

const ZONE_COLUMNS: &str = "id, name, governorate_id, is_active, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, zone_id, employee_id, role, is_active, created_at, updated_at";

pub async fn create_zone(pool: &PgPool, request: CreateZoneRequest) -> WorkerResult<Zone> {
    let governorate: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM governorates WHERE id = $1")
            .bind(request.governorate_id)
            .fetch_optional(pool)
            .await?;
    if governorate.is_none() {
        return Err(WorkerError::not_found("governorate not found"));
    }

    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM zones WHERE name = $1")
        .bind(&request.name)
        .fetch_optional(pool)
        .await?;
    if duplicate.is_some() {
        return Err(WorkerError::conflict(format!(
            "zone '{}' already exists",
            request.name
        )));
    }

    let zone = sqlx::query_as::<_, Zone>(&format!(
        "INSERT INTO zones (name, governorate_id) VALUES ($1, $2) RETURNING {ZONE_COLUMNS}"
    ))
    .bind(&request.name)
    .bind(request.governorate_id)
    .fetch_one(pool)
    .await?;

    Ok(zone)
}

pub async fn get_zone(pool: &PgPool, id: Uuid) -> WorkerResult<Option<Zone>> {
    let zone = sqlx::query_as::<_, Zone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(zone)
}

pub async fn list_zones(pool: &PgPool, request: ListZonesRequest) -> WorkerResult<Vec<Zone>> {
    let active_only = request.active_only.unwrap_or(true);

    let zones = sqlx::query_as::<_, Zone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM zones WHERE ($1 = FALSE OR is_active = TRUE) ORDER BY name ASC"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(zones)
}

pub async fn update_zone(pool: &PgPool, request: UpdateZoneRequest) -> WorkerResult<Zone> {
    let existing = get_zone(pool, request.id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("zone {} not found", request.id)))?;

    let name = request.name.unwrap_or(existing.name);
    let is_active = request.is_active.unwrap_or(existing.is_active);

    let zone = sqlx::query_as::<_, Zone>(&format!(
        "UPDATE zones SET name = $1, is_active = $2, updated_at = NOW() WHERE id = $3 RETURNING {ZONE_COLUMNS}"
    ))
    .bind(&name)
    .bind(is_active)
    .bind(request.id)
    .fetch_one(pool)
    .await?;

    Ok(zone)
}

/// Assign an employee to a zone with the given role.
///
/// Single code path for all roles. For head roles the previous active
/// holder (if any, and a different employee) is deactivated first. An
/// existing membership row for the employee is reactivated and re-roled.
pub async fn assign_member(
    pool: &PgPool,
    request: AssignZoneMemberRequest,
) -> WorkerResult<ZoneMember> {
    let zone = get_zone(pool, request.zone_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("zone {} not found", request.zone_id)))?;
    if !zone.is_active {
        return Err(WorkerError::validation("cannot assign to an inactive zone"));
    }
    crate::db::queries::employee::get_active_employee(pool, request.employee_id).await?;

    let mut tx = pool.begin().await?;

    if request.role.is_head() {
        sqlx::query(
            r#"
            UPDATE zone_members
            SET is_active = FALSE, updated_at = NOW()
            WHERE zone_id = $1 AND role = $2 AND is_active = TRUE AND employee_id <> $3
            "#,
        )
        .bind(request.zone_id)
        .bind(request.role)
        .bind(request.employee_id)
        .execute(&mut *tx)
        .await?;
    }

    let member = sqlx::query_as::<_, ZoneMember>(&format!(
        r#"
        INSERT INTO zone_members (zone_id, employee_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (zone_id, employee_id)
        DO UPDATE SET role = EXCLUDED.role, is_active = TRUE, updated_at = NOW()
        RETURNING {MEMBER_COLUMNS}
        "#
    ))
    .bind(request.zone_id)
    .bind(request.employee_id)
    .bind(request.role)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(member)
}

/// Deactivate a membership row. Works identically for heads and crew.
pub async fn remove_member(
    pool: &PgPool,
    zone_id: Uuid,
    employee_id: Uuid,
) -> WorkerResult<ZoneMember> {
    let member = sqlx::query_as::<_, ZoneMember>(&format!(
        r#"
        UPDATE zone_members
        SET is_active = FALSE, updated_at = NOW()
        WHERE zone_id = $1 AND employee_id = $2 AND is_active = TRUE
        RETURNING {MEMBER_COLUMNS}
        "#
    ))
    .bind(zone_id)
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    member.ok_or_else(|| {
        WorkerError::not_found(format!(
            "employee {employee_id} is not an active member of zone {zone_id}"
        ))
    })
}

/// Active members of a zone with employee details, heads first.
pub async fn list_team(pool: &PgPool, zone_id: Uuid) -> WorkerResult<Vec<ZoneMemberWithEmployee>> {
    let members = sqlx::query_as::<_, ZoneMemberWithEmployee>(
        r#"
        SELECT zm.id, zm.zone_id, zm.employee_id, zm.role, zm.is_active,
               e.full_name, e.email, e.department_id, e.is_active AS employee_is_active
        FROM zone_members zm
        JOIN employees e ON e.id = zm.employee_id
        WHERE zm.zone_id = $1 AND zm.is_active = TRUE
        ORDER BY CASE zm.role
                     WHEN 'primary_head' THEN 0
                     WHEN 'secondary_head' THEN 1
                     WHEN 'technician' THEN 2
                     ELSE 3
                 END,
                 e.full_name ASC
        "#,
    )
    .bind(zone_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}

/// The active employee holding the given head role, if any.
pub async fn get_head(
    pool: &PgPool,
    zone_id: Uuid,
    role: ZoneRole,
) -> WorkerResult<Option<Employee>> {
    let head = sqlx::query_as::<_, Employee>(
        r#"
        SELECT e.id, e.full_name, e.email, e.phone, e.department_id, e.is_active,
               e.created_at, e.updated_at
        FROM zone_members zm
        JOIN employees e ON e.id = zm.employee_id
        WHERE zm.zone_id = $1 AND zm.role = $2 AND zm.is_active = TRUE
          AND e.is_active = TRUE
        "#,
    )
    .bind(zone_id)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    Ok(head)
}

pub async fn map_area(pool: &PgPool, request: MapZoneAreaRequest) -> WorkerResult<ZoneArea> {
    let zone = get_zone(pool, request.zone_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("zone {} not found", request.zone_id)))?;
    if !zone.is_active {
        return Err(WorkerError::validation("cannot map areas to an inactive zone"));
    }

    let taken: Option<(Uuid,)> = sqlx::query_as(
        "SELECT zone_id FROM zone_areas WHERE area_id = $1 AND is_active = TRUE",
    )
    .bind(request.area_id)
    .fetch_optional(pool)
    .await?;
    if let Some((zone_id,)) = taken {
        if zone_id != request.zone_id {
            return Err(WorkerError::conflict(format!(
                "area {} is already covered by zone {zone_id}",
                request.area_id
            )));
        }
    }

    let mapping = sqlx::query_as::<_, ZoneArea>(
        r#"
        INSERT INTO zone_areas (zone_id, area_id)
        VALUES ($1, $2)
        RETURNING id, zone_id, area_id, is_active, created_at
        "#,
    )
    .bind(request.zone_id)
    .bind(request.area_id)
    .fetch_one(pool)
    .await?;

    Ok(mapping)
}

pub async fn unmap_area(pool: &PgPool, zone_id: Uuid, area_id: Uuid) -> WorkerResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE zone_areas
        SET is_active = FALSE
        WHERE zone_id = $1 AND area_id = $2 AND is_active = TRUE
        "#,
    )
    .bind(zone_id)
    .bind(area_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn create_governorate(pool: &PgPool, name: &str) -> WorkerResult<Governorate> {
    let duplicate: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM governorates WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if duplicate.is_some() {
        return Err(WorkerError::conflict(format!(
            "governorate '{name}' already exists"
        )));
    }

    let governorate = sqlx::query_as::<_, Governorate>(
        "INSERT INTO governorates (name) VALUES ($1) RETURNING id, name, is_active, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(governorate)
}

pub async fn create_area(
    pool: &PgPool,
    name: &str,
    governorate_id: Uuid,
) -> WorkerResult<Area> {
    let area = sqlx::query_as::<_, Area>(
        r#"
        INSERT INTO areas (name, governorate_id)
        VALUES ($1, $2)
        RETURNING id, name, governorate_id, is_active, created_at
        "#,
    )
    .bind(name)
    .bind(governorate_id)
    .fetch_one(pool)
    .await?;

    Ok(area)
}

/// An active head employee together with one zone they are answerable for.
/// Employees heading several zones appear once per zone.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ZoneHeadRow {
    pub employee_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub zone_id: Uuid,
    pub zone_name: String,
    pub role: ZoneRole,
}

/// All active heads across active zones, for the daily summary jobs.
pub async fn list_active_heads(pool: &PgPool) -> WorkerResult<Vec<ZoneHeadRow>> {
    let heads = sqlx::query_as::<_, ZoneHeadRow>(
        r#"
        SELECT e.id AS employee_id, e.full_name, e.email,
               z.id AS zone_id, z.name AS zone_name, zm.role
        FROM zone_members zm
        JOIN zones z ON z.id = zm.zone_id
        JOIN employees e ON e.id = zm.employee_id
        WHERE zm.is_active = TRUE
          AND zm.role IN ('primary_head', 'secondary_head')
          AND z.is_active = TRUE
          AND e.is_active = TRUE
        ORDER BY e.full_name, z.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(heads)
}

/// Resolve the zone covering an area. The exclusive mapping guarantees at
/// most one.
pub async fn zone_for_area(pool: &PgPool, area_id: Uuid) -> WorkerResult<Option<Zone>> {
    let zone = sqlx::query_as::<_, Zone>(
        r#"
        SELECT z.id, z.name, z.governorate_id, z.is_active, z.created_at, z.updated_at
        FROM zone_areas za
        JOIN zones z ON z.id = za.zone_id
        WHERE za.area_id = $1 AND za.is_active = TRUE AND z.is_active = TRUE
        "#,
    )
    .bind(area_id)
    .fetch_optional(pool)
    .await?;

    Ok(zone)
}
