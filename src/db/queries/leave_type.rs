//! Leave type queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::{CreateLeaveTypeRequest, LeaveType, UpdateLeaveTypeRequest};

const COLUMNS: &str = "id, name, default_days, max_consecutive_days, requires_approval, is_active, created_at, updated_at";

pub async fn create_leave_type(
    pool: &PgPool,
    request: CreateLeaveTypeRequest,
) -> WorkerResult<LeaveType> {
    if request.default_days < 0 {
        return Err(WorkerError::validation("defaultDays must not be negative"));
    }
    if matches!(request.max_consecutive_days, Some(d) if d <= 0) {
        return Err(WorkerError::validation(
            "maxConsecutiveDays must be positive when set",
        ));
    }

    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM leave_types WHERE name = $1")
        .bind(&request.name)
        .fetch_optional(pool)
        .await?;
    if duplicate.is_some() {
        return Err(WorkerError::conflict(format!(
            "leave type '{}' already exists",
            request.name
        )));
    }

    let leave_type = sqlx::query_as::<_, LeaveType>(&format!(
        r#"
        INSERT INTO leave_types (name, default_days, max_consecutive_days, requires_approval)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&request.name)
    .bind(request.default_days)
    .bind(request.max_consecutive_days)
    .bind(request.requires_approval.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    Ok(leave_type)
}

pub async fn get_leave_type(pool: &PgPool, id: Uuid) -> WorkerResult<Option<LeaveType>> {
    let leave_type =
        sqlx::query_as::<_, LeaveType>(&format!("SELECT {COLUMNS} FROM leave_types WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(leave_type)
}

pub async fn list_leave_types(pool: &PgPool) -> WorkerResult<Vec<LeaveType>> {
    let leave_types = sqlx::query_as::<_, LeaveType>(&format!(
        "SELECT {COLUMNS} FROM leave_types WHERE is_active = TRUE ORDER BY name ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(leave_types)
}

pub async fn update_leave_type(
    pool: &PgPool,
    request: UpdateLeaveTypeRequest,
) -> WorkerResult<LeaveType> {
    let existing = get_leave_type(pool, request.id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("leave type {} not found", request.id)))?;

    let default_days = request.default_days.unwrap_or(existing.default_days);
    let max_consecutive = request
        .max_consecutive_days
        .or(existing.max_consecutive_days);
    let requires_approval = request
        .requires_approval
        .unwrap_or(existing.requires_approval);
    let is_active = request.is_active.unwrap_or(existing.is_active);

    if default_days < 0 {
        return Err(WorkerError::validation("defaultDays must not be negative"));
    }

    let leave_type = sqlx::query_as::<_, LeaveType>(&format!(
        r#"
        UPDATE leave_types
        SET default_days = $1, max_consecutive_days = $2, requires_approval = $3,
            is_active = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING {COLUMNS}
        "#
    ))
    .bind(default_days)
    .bind(max_consecutive)
    .bind(requires_approval)
    .bind(is_active)
    .bind(request.id)
    .fetch_one(pool)
    .await?;

    Ok(leave_type)
}
