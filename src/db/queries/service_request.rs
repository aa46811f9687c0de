//! Service request queries

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries::employee;
use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    ListServiceRequestsRequest, ServiceRequest, ServiceRequestStatus, TimelineEntry,
};

const COLUMNS: &str = "id, customer_id, property_id, unit_id, zone_id, complaint_type_id, assigned_to_id, status, description, preferred_date, created_at, updated_at";

/// Fully resolved insert data: the assignment service has already decided
/// zone and assignee by the time this runs.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub customer_id: Uuid,
    pub property_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub zone_id: Uuid,
    pub complaint_type_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub description: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    /// Timeline note explaining the auto-assignment decision
    pub assignment_note: Option<String>,
}

/// Insert a request plus its timeline entries in one transaction.
pub async fn insert_service_request(
    pool: &PgPool,
    data: NewServiceRequest,
) -> WorkerResult<ServiceRequest> {
    let status = if data.assigned_to_id.is_some() {
        ServiceRequestStatus::Assigned
    } else {
        ServiceRequestStatus::New
    };

    let mut tx = pool.begin().await?;

    let request = sqlx::query_as::<_, ServiceRequest>(&format!(
        r#"
        INSERT INTO service_requests
            (customer_id, property_id, unit_id, zone_id, complaint_type_id,
             assigned_to_id, status, description, preferred_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.customer_id)
    .bind(data.property_id)
    .bind(data.unit_id)
    .bind(data.zone_id)
    .bind(data.complaint_type_id)
    .bind(data.assigned_to_id)
    .bind(status)
    .bind(&data.description)
    .bind(data.preferred_date)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO service_request_timeline (service_request_id, status, note)
        VALUES ($1, 'new', 'Request created')
        "#,
    )
    .bind(request.id)
    .execute(&mut *tx)
    .await?;

    if status == ServiceRequestStatus::Assigned {
        sqlx::query(
            r#"
            INSERT INTO service_request_timeline (service_request_id, status, note)
            VALUES ($1, 'assigned', $2)
            "#,
        )
        .bind(request.id)
        .bind(&data.assignment_note)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(request)
}

pub async fn get_service_request(pool: &PgPool, id: Uuid) -> WorkerResult<Option<ServiceRequest>> {
    let request = sqlx::query_as::<_, ServiceRequest>(&format!(
        "SELECT {COLUMNS} FROM service_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

pub async fn list_service_requests(
    pool: &PgPool,
    request: ListServiceRequestsRequest,
) -> WorkerResult<Vec<ServiceRequest>> {
    let requests = sqlx::query_as::<_, ServiceRequest>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM service_requests
        WHERE ($1::uuid IS NULL OR zone_id = $1)
          AND ($2::service_request_status IS NULL OR status = $2)
          AND ($3::uuid IS NULL OR assigned_to_id = $3)
        ORDER BY created_at DESC
        "#
    ))
    .bind(request.zone_id)
    .bind(request.status)
    .bind(request.assigned_to_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Move a request through the status graph, recording the step.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    next: ServiceRequestStatus,
    note: Option<&str>,
    actor_id: Option<Uuid>,
) -> WorkerResult<ServiceRequest> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, ServiceRequest>(&format!(
        "SELECT {COLUMNS} FROM service_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| WorkerError::not_found(format!("service request {id} not found")))?;

    if !existing.status.can_transition_to(next) {
        return Err(WorkerError::validation(format!(
            "cannot move a {} request to {}",
            existing.status.as_str(),
            next.as_str()
        )));
    }

    let request = sqlx::query_as::<_, ServiceRequest>(&format!(
        r#"
        UPDATE service_requests
        SET status = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(next)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO service_request_timeline (service_request_id, status, note, actor_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(next)
    .bind(note)
    .bind(actor_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(request)
}

/// Manually set the assignee. A NEW request moves to ASSIGNED; requests
/// already past NEW keep their status and only change hands.
pub async fn assign(
    pool: &PgPool,
    id: Uuid,
    employee_id: Uuid,
    note: Option<&str>,
    actor_id: Option<Uuid>,
) -> WorkerResult<ServiceRequest> {
    employee::get_active_employee(pool, employee_id).await?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, ServiceRequest>(&format!(
        "SELECT {COLUMNS} FROM service_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| WorkerError::not_found(format!("service request {id} not found")))?;

    let next = match existing.status {
        ServiceRequestStatus::New => ServiceRequestStatus::Assigned,
        ServiceRequestStatus::Assigned | ServiceRequestStatus::InProgress => existing.status,
        other => {
            return Err(WorkerError::validation(format!(
                "cannot reassign a {} request",
                other.as_str()
            )));
        }
    };

    let request = sqlx::query_as::<_, ServiceRequest>(&format!(
        r#"
        UPDATE service_requests
        SET assigned_to_id = $1, status = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING {COLUMNS}
        "#
    ))
    .bind(employee_id)
    .bind(next)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO service_request_timeline (service_request_id, status, note, actor_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(next)
    .bind(note)
    .bind(actor_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(request)
}

pub async fn list_timeline(pool: &PgPool, request_id: Uuid) -> WorkerResult<Vec<TimelineEntry>> {
    let entries = sqlx::query_as::<_, TimelineEntry>(
        r#"
        SELECT id, service_request_id, status, note, actor_id, created_at
        FROM service_request_timeline
        WHERE service_request_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Open assigned work in the given zones with a preferred date, for the
/// zone-head daily summaries.
pub async fn upcoming_in_zones(
    pool: &PgPool,
    zone_ids: &[Uuid],
    date: NaiveDate,
) -> WorkerResult<Vec<ServiceRequest>> {
    if zone_ids.is_empty() {
        return Ok(Vec::new());
    }

    let requests = sqlx::query_as::<_, ServiceRequest>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM service_requests
        WHERE zone_id = ANY($1)
          AND preferred_date = $2
          AND status IN ('assigned', 'in_progress')
        ORDER BY created_at ASC
        "#
    ))
    .bind(zone_ids)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}
