//! Leave balance queries.
//!
//! Balance mutations always run inside the caller's transaction with the
//! row locked, so concurrent requests cannot both pass the sufficiency
//! check against a stale counter.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::WorkerResult;
use crate::types::{LeaveBalance, LeaveType};

const COLUMNS: &str = "id, employee_id, leave_type_id, year, total_days, used_days, pending_days, carry_over_days, created_at, updated_at";

/// All balances of an employee for a year, one row per leave type that has
/// ever been drawn against. Balances are created lazily by requests, never
/// by this listing.
pub async fn get_balances(
    pool: &PgPool,
    employee_id: Uuid,
    year: i32,
) -> WorkerResult<Vec<LeaveBalance>> {
    let balances = sqlx::query_as::<_, LeaveBalance>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM leave_balances
        WHERE employee_id = $1 AND year = $2
        ORDER BY leave_type_id
        "#
    ))
    .bind(employee_id)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(balances)
}

/// Fetch the balance row for (employee, type, year), creating it with the
/// type's default entitlement if absent, and lock it for the remainder of
/// the transaction.
pub async fn lock_or_create_balance(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    leave_type: &LeaveType,
    year: i32,
) -> WorkerResult<LeaveBalance> {
    sqlx::query(
        r#"
        INSERT INTO leave_balances (employee_id, leave_type_id, year, total_days)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (employee_id, leave_type_id, year) DO NOTHING
        "#,
    )
    .bind(employee_id)
    .bind(leave_type.id)
    .bind(year)
    .bind(leave_type.default_days)
    .execute(&mut **tx)
    .await?;

    let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM leave_balances
        WHERE employee_id = $1 AND leave_type_id = $2 AND year = $3
        FOR UPDATE
        "#
    ))
    .bind(employee_id)
    .bind(leave_type.id)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;

    Ok(balance)
}

/// Lock the balance row backing an existing request. The row must exist:
/// request creation made it.
pub async fn lock_balance(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
) -> WorkerResult<LeaveBalance> {
    let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM leave_balances
        WHERE employee_id = $1 AND leave_type_id = $2 AND year = $3
        FOR UPDATE
        "#
    ))
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;

    Ok(balance)
}

/// Apply day-counter deltas to a locked balance row.
pub async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    balance_id: Uuid,
    pending_delta: i32,
    used_delta: i32,
) -> WorkerResult<()> {
    sqlx::query(
        r#"
        UPDATE leave_balances
        SET pending_days = pending_days + $1,
            used_days = used_days + $2,
            updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(pending_delta)
    .bind(used_delta)
    .bind(balance_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
