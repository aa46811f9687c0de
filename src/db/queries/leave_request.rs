//! Leave request lifecycle queries.
//!
//! Every lifecycle move runs in a single transaction that locks the
//! employee's balance row before checking or moving day counters.
//! Counter symmetry:
//!   create (pending)   pending += total
//!   create (auto-appr) used    += total
//!   approve            pending -= total, used += total
//!   reject             pending -= total
//!   cancel (pending)   pending -= total
//!   cancel (approved)  used    -= total
//!   update (pending)   pending += new_total - old_total

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::queries::{employee, leave_balance, leave_type};
use crate::error::{WorkerError, WorkerResult};
use crate::services::leave_rules;
use crate::types::{
    CreateLeaveRequestRequest, LeaveRequest, LeaveStatus, ListLeaveRequestsRequest,
    UpdateLeaveRequestRequest,
};

const COLUMNS: &str = "id, employee_id, leave_type_id, start_date, end_date, total_days, status, reason, approver_id, approved_at, rejection_reason, covering_employee_id, created_at, updated_at";

pub async fn create_leave_request(
    pool: &PgPool,
    request: CreateLeaveRequestRequest,
) -> WorkerResult<LeaveRequest> {
    let employee = employee::get_active_employee(pool, request.employee_id).await?;

    let leave_type = leave_type::get_leave_type(pool, request.leave_type_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| WorkerError::not_found("leave type not found"))?;

    if let Some(covering_id) = request.covering_employee_id {
        if covering_id == employee.id {
            return Err(WorkerError::validation(
                "covering employee cannot be the requester",
            ));
        }
        employee::get_active_employee(pool, covering_id).await?;
    }

    if request.start_date > request.end_date {
        return Err(WorkerError::validation("startDate must not be after endDate"));
    }

    let total_days = leave_rules::inclusive_days(request.start_date, request.end_date) as i32;
    if let Some(max) = leave_type.max_consecutive_days {
        if total_days > max {
            return Err(WorkerError::validation(format!(
                "{total_days} days exceeds the {max}-day limit for {}",
                leave_type.name
            )));
        }
    }

    let mut tx = pool.begin().await?;

    let open_requests = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        SELECT {COLUMNS} FROM leave_requests
        WHERE employee_id = $1 AND status IN ('pending', 'approved')
        "#
    ))
    .bind(employee.id)
    .fetch_all(&mut *tx)
    .await?;
    if open_requests.iter().any(|r| {
        leave_rules::ranges_overlap(r.start_date, r.end_date, request.start_date, request.end_date)
    }) {
        return Err(WorkerError::conflict(
            "an overlapping leave request already exists for this employee",
        ));
    }

    let year = leave_rules::balance_year(request.start_date);
    let balance =
        leave_balance::lock_or_create_balance(&mut tx, employee.id, &leave_type, year).await?;

    if total_days > balance.available_days() {
        return Err(WorkerError::validation(format!(
            "insufficient leave balance: requested {total_days}, available {}",
            balance.available_days()
        )));
    }

    let auto_approved = !leave_type.requires_approval;
    let status = if auto_approved {
        LeaveStatus::Approved
    } else {
        LeaveStatus::Pending
    };
    let approved_at = auto_approved.then(Utc::now);

    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type_id, start_date, end_date, total_days,
             status, reason, approved_at, covering_employee_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(employee.id)
    .bind(leave_type.id)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(total_days)
    .bind(status)
    .bind(&request.reason)
    .bind(approved_at)
    .bind(request.covering_employee_id)
    .fetch_one(&mut *tx)
    .await?;

    // Auto-approved requests count against used days only; pending stays
    // untouched on that path.
    if auto_approved {
        leave_balance::apply_delta(&mut tx, balance.id, 0, total_days).await?;
    } else {
        leave_balance::apply_delta(&mut tx, balance.id, total_days, 0).await?;
    }

    tx.commit().await?;

    Ok(leave_request)
}

pub async fn get_leave_request(pool: &PgPool, id: Uuid) -> WorkerResult<Option<LeaveRequest>> {
    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(leave_request)
}

pub async fn list_leave_requests(
    pool: &PgPool,
    request: ListLeaveRequestsRequest,
) -> WorkerResult<Vec<LeaveRequest>> {
    let leave_requests = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM leave_requests
        WHERE ($1::uuid IS NULL OR employee_id = $1)
          AND ($2::leave_status IS NULL OR status = $2)
        ORDER BY start_date DESC
        "#
    ))
    .bind(request.employee_id)
    .bind(request.status)
    .fetch_all(pool)
    .await?;

    Ok(leave_requests)
}

/// Lock a request row for a lifecycle transition.
async fn lock_request(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> WorkerResult<LeaveRequest> {
    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    leave_request.ok_or_else(|| WorkerError::not_found(format!("leave request {id} not found")))
}

pub async fn approve_leave_request(
    pool: &PgPool,
    id: Uuid,
    approver_id: Uuid,
) -> WorkerResult<LeaveRequest> {
    let mut tx = pool.begin().await?;

    let existing = lock_request(&mut tx, id).await?;
    let (pending_delta, used_delta) =
        leave_rules::counter_deltas(existing.status, LeaveStatus::Approved, existing.total_days)
            .ok_or_else(|| {
                WorkerError::validation(format!(
                    "only pending requests can be approved (current: {})",
                    existing.status.as_str()
                ))
            })?;

    let year = leave_rules::balance_year(existing.start_date);
    let balance =
        leave_balance::lock_balance(&mut tx, existing.employee_id, existing.leave_type_id, year)
            .await?;
    leave_balance::apply_delta(&mut tx, balance.id, pending_delta, used_delta).await?;

    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        UPDATE leave_requests
        SET status = 'approved', approver_id = $1, approved_at = NOW(), updated_at = NOW()
        WHERE id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(approver_id)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(leave_request)
}

pub async fn reject_leave_request(
    pool: &PgPool,
    id: Uuid,
    approver_id: Uuid,
    rejection_reason: &str,
) -> WorkerResult<LeaveRequest> {
    let mut tx = pool.begin().await?;

    let existing = lock_request(&mut tx, id).await?;
    let (pending_delta, used_delta) =
        leave_rules::counter_deltas(existing.status, LeaveStatus::Rejected, existing.total_days)
            .ok_or_else(|| {
                WorkerError::validation(format!(
                    "only pending requests can be rejected (current: {})",
                    existing.status.as_str()
                ))
            })?;

    let year = leave_rules::balance_year(existing.start_date);
    let balance =
        leave_balance::lock_balance(&mut tx, existing.employee_id, existing.leave_type_id, year)
            .await?;
    leave_balance::apply_delta(&mut tx, balance.id, pending_delta, used_delta).await?;

    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        UPDATE leave_requests
        SET status = 'rejected', approver_id = $1, rejection_reason = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING {COLUMNS}
        "#
    ))
    .bind(approver_id)
    .bind(rejection_reason)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(leave_request)
}

pub async fn cancel_leave_request(pool: &PgPool, id: Uuid) -> WorkerResult<LeaveRequest> {
    let mut tx = pool.begin().await?;

    let existing = lock_request(&mut tx, id).await?;
    let (pending_delta, used_delta) =
        leave_rules::counter_deltas(existing.status, LeaveStatus::Cancelled, existing.total_days)
            .ok_or_else(|| {
                WorkerError::validation(format!(
                    "cannot cancel a {} request",
                    existing.status.as_str()
                ))
            })?;

    let year = leave_rules::balance_year(existing.start_date);
    let balance =
        leave_balance::lock_balance(&mut tx, existing.employee_id, existing.leave_type_id, year)
            .await?;
    leave_balance::apply_delta(&mut tx, balance.id, pending_delta, used_delta).await?;

    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled', updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(leave_request)
}

/// Update a pending request. Date changes shift `pending_days` by the
/// delta and re-validate the consecutive-day limit; overlap and balance
/// sufficiency are not re-checked here.
pub async fn update_leave_request(
    pool: &PgPool,
    request: UpdateLeaveRequestRequest,
) -> WorkerResult<LeaveRequest> {
    if let Some(covering_id) = request.covering_employee_id {
        employee::get_active_employee(pool, covering_id).await?;
    }

    let mut tx = pool.begin().await?;

    let existing = lock_request(&mut tx, request.id).await?;
    if existing.status != LeaveStatus::Pending {
        return Err(WorkerError::validation(
            "only pending requests can be updated",
        ));
    }

    let start_date = request.start_date.unwrap_or(existing.start_date);
    let end_date = request.end_date.unwrap_or(existing.end_date);
    if start_date > end_date {
        return Err(WorkerError::validation("startDate must not be after endDate"));
    }

    let total_days = leave_rules::inclusive_days(start_date, end_date) as i32;
    if total_days != existing.total_days {
        let leave_type = leave_type::get_leave_type(pool, existing.leave_type_id)
            .await?
            .ok_or_else(|| WorkerError::not_found("leave type not found"))?;
        if let Some(max) = leave_type.max_consecutive_days {
            if total_days > max {
                return Err(WorkerError::validation(format!(
                    "{total_days} days exceeds the {max}-day limit for {}",
                    leave_type.name
                )));
            }
        }

        let year = leave_rules::balance_year(existing.start_date);
        let balance = leave_balance::lock_balance(
            &mut tx,
            existing.employee_id,
            existing.leave_type_id,
            year,
        )
        .await?;
        leave_balance::apply_delta(&mut tx, balance.id, total_days - existing.total_days, 0)
            .await?;
    }

    let reason = request.reason.or(existing.reason);
    let covering = request.covering_employee_id.or(existing.covering_employee_id);

    let leave_request = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        UPDATE leave_requests
        SET start_date = $1, end_date = $2, total_days = $3, reason = $4,
            covering_employee_id = $5, updated_at = NOW()
        WHERE id = $6
        RETURNING {COLUMNS}
        "#
    ))
    .bind(start_date)
    .bind(end_date)
    .bind(total_days)
    .bind(&reason)
    .bind(covering)
    .bind(request.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(leave_request)
}

/// Approved requests of any listed employee overlapping the given range.
/// Used by the coverage resolver.
pub async fn approved_overlapping(
    pool: &PgPool,
    employee_ids: &[Uuid],
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> WorkerResult<Vec<LeaveRequest>> {
    if employee_ids.is_empty() {
        return Ok(Vec::new());
    }

    let leave_requests = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM leave_requests
        WHERE employee_id = ANY($1)
          AND status = 'approved'
          AND start_date <= $2
          AND end_date >= $3
        "#
    ))
    .bind(employee_ids)
    .bind(end_date)
    .bind(start_date)
    .fetch_all(pool)
    .await?;

    Ok(leave_requests)
}
