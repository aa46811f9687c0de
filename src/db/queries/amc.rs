//! AMC contract queries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    AmcContract, AmcContractProperty, AmcContractService, AmcPaymentSchedule, AmcServiceSchedule,
    AmcStatus, CreateAmcContractRequest, ListAmcContractsRequest,
};

const CONTRACT_COLUMNS: &str = "id, customer_id, contract_no, status, start_date, end_date, contract_value, payment_terms, created_at, updated_at";

pub async fn create_contract(
    pool: &PgPool,
    request: CreateAmcContractRequest,
) -> WorkerResult<AmcContract> {
    if request.start_date > request.end_date {
        return Err(WorkerError::validation("startDate must not be after endDate"));
    }
    if request.property_ids.is_empty() {
        return Err(WorkerError::validation(
            "a contract must cover at least one property",
        ));
    }
    if request.services.is_empty() {
        return Err(WorkerError::validation(
            "a contract must include at least one service line",
        ));
    }
    if request.contract_value <= Decimal::ZERO {
        return Err(WorkerError::validation("contractValue must be positive"));
    }

    let duplicate: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM amc_contracts WHERE contract_no = $1")
            .bind(&request.contract_no)
            .fetch_optional(pool)
            .await?;
    if duplicate.is_some() {
        return Err(WorkerError::conflict(format!(
            "contract {} already exists",
            request.contract_no
        )));
    }

    let mut tx = pool.begin().await?;

    let contract = sqlx::query_as::<_, AmcContract>(&format!(
        r#"
        INSERT INTO amc_contracts
            (customer_id, contract_no, start_date, end_date, contract_value, payment_terms)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {CONTRACT_COLUMNS}
        "#
    ))
    .bind(request.customer_id)
    .bind(&request.contract_no)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.contract_value)
    .bind(request.payment_terms)
    .fetch_one(&mut *tx)
    .await?;

    for property_id in &request.property_ids {
        sqlx::query(
            "INSERT INTO amc_contract_properties (contract_id, property_id) VALUES ($1, $2)",
        )
        .bind(contract.id)
        .bind(property_id)
        .execute(&mut *tx)
        .await?;
    }

    for service in &request.services {
        sqlx::query(
            "INSERT INTO amc_contract_services (contract_id, name, frequency) VALUES ($1, $2, $3)",
        )
        .bind(contract.id)
        .bind(&service.name)
        .bind(service.frequency)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(contract)
}

pub async fn get_contract(pool: &PgPool, id: Uuid) -> WorkerResult<Option<AmcContract>> {
    let contract = sqlx::query_as::<_, AmcContract>(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM amc_contracts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(contract)
}

pub async fn list_contracts(
    pool: &PgPool,
    request: ListAmcContractsRequest,
) -> WorkerResult<Vec<AmcContract>> {
    let contracts = sqlx::query_as::<_, AmcContract>(&format!(
        r#"
        SELECT {CONTRACT_COLUMNS}
        FROM amc_contracts
        WHERE ($1::uuid IS NULL OR customer_id = $1)
          AND ($2::amc_status IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#
    ))
    .bind(request.customer_id)
    .bind(request.status)
    .fetch_all(pool)
    .await?;

    Ok(contracts)
}

pub async fn list_properties(
    pool: &PgPool,
    contract_id: Uuid,
) -> WorkerResult<Vec<AmcContractProperty>> {
    let properties = sqlx::query_as::<_, AmcContractProperty>(
        "SELECT id, contract_id, property_id FROM amc_contract_properties WHERE contract_id = $1",
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(properties)
}

pub async fn list_services(
    pool: &PgPool,
    contract_id: Uuid,
) -> WorkerResult<Vec<AmcContractService>> {
    let services = sqlx::query_as::<_, AmcContractService>(
        "SELECT id, contract_id, name, frequency FROM amc_contract_services WHERE contract_id = $1",
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn list_schedules(
    pool: &PgPool,
    contract_id: Uuid,
) -> WorkerResult<Vec<AmcServiceSchedule>> {
    let schedules = sqlx::query_as::<_, AmcServiceSchedule>(
        r#"
        SELECT id, contract_id, contract_service_id, property_id, scheduled_date, status, created_at
        FROM amc_service_schedules
        WHERE contract_id = $1
        ORDER BY scheduled_date ASC
        "#,
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

pub async fn list_payments(
    pool: &PgPool,
    contract_id: Uuid,
) -> WorkerResult<Vec<AmcPaymentSchedule>> {
    let payments = sqlx::query_as::<_, AmcPaymentSchedule>(
        r#"
        SELECT id, contract_id, installment_no, due_date, amount, status, paid_at, created_at
        FROM amc_payment_schedules
        WHERE contract_id = $1
        ORDER BY installment_no ASC
        "#,
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: AmcStatus,
) -> WorkerResult<AmcContract> {
    let contract = sqlx::query_as::<_, AmcContract>(&format!(
        r#"
        UPDATE amc_contracts
        SET status = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING {CONTRACT_COLUMNS}
        "#
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    contract.ok_or_else(|| WorkerError::not_found(format!("contract {id} not found")))
}

/// Hard delete, allowed only while a contract is still a draft.
pub async fn delete_draft(pool: &PgPool, id: Uuid) -> WorkerResult<()> {
    let result = sqlx::query("DELETE FROM amc_contracts WHERE id = $1 AND status = 'draft'")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(WorkerError::validation(
            "only draft contracts can be deleted",
        ));
    }

    Ok(())
}

/// Purge rows still SCHEDULED. Completed/missed/cancelled visits survive
/// regeneration.
pub async fn delete_scheduled_visits(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: Uuid,
) -> WorkerResult<u64> {
    let result = sqlx::query(
        "DELETE FROM amc_service_schedules WHERE contract_id = $1 AND status = 'scheduled'",
    )
    .bind(contract_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Purge rows still PENDING. Paid/partially-paid/overdue installments
/// survive regeneration.
pub async fn delete_pending_payments(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: Uuid,
) -> WorkerResult<u64> {
    let result = sqlx::query(
        "DELETE FROM amc_payment_schedules WHERE contract_id = $1 AND status = 'pending'",
    )
    .bind(contract_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Batch-insert generated visits.
pub async fn insert_visits(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: Uuid,
    visits: &[(Uuid, Uuid, NaiveDate)],
) -> WorkerResult<u64> {
    if visits.is_empty() {
        return Ok(0);
    }

    let service_ids: Vec<Uuid> = visits.iter().map(|v| v.0).collect();
    let property_ids: Vec<Uuid> = visits.iter().map(|v| v.1).collect();
    let dates: Vec<NaiveDate> = visits.iter().map(|v| v.2).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO amc_service_schedules (contract_id, contract_service_id, property_id, scheduled_date)
        SELECT $1, s, p, d FROM UNNEST($2::uuid[], $3::uuid[], $4::date[]) AS t(s, p, d)
        "#,
    )
    .bind(contract_id)
    .bind(&service_ids)
    .bind(&property_ids)
    .bind(&dates)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Batch-insert generated installments.
pub async fn insert_payments(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: Uuid,
    installments: &[(i32, NaiveDate, Decimal)],
) -> WorkerResult<u64> {
    if installments.is_empty() {
        return Ok(0);
    }

    let numbers: Vec<i32> = installments.iter().map(|i| i.0).collect();
    let due_dates: Vec<NaiveDate> = installments.iter().map(|i| i.1).collect();
    let amounts: Vec<Decimal> = installments.iter().map(|i| i.2).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO amc_payment_schedules (contract_id, installment_no, due_date, amount)
        SELECT $1, n, d, a FROM UNNEST($2::int[], $3::date[], $4::numeric[]) AS t(n, d, a)
        "#,
    )
    .bind(contract_id)
    .bind(&numbers)
    .bind(&due_dates)
    .bind(&amounts)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// A visit due on a date, resolved to the zone covering its property.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueVisitRow {
    pub zone_id: Uuid,
    pub service_name: String,
    pub address: String,
    pub scheduled_date: NaiveDate,
}

/// Scheduled AMC visits falling on `date` at properties inside the given
/// zones, for the zone-head daily summaries.
pub async fn due_visits_in_zones(
    pool: &PgPool,
    zone_ids: &[Uuid],
    date: NaiveDate,
) -> WorkerResult<Vec<DueVisitRow>> {
    if zone_ids.is_empty() {
        return Ok(Vec::new());
    }

    let visits = sqlx::query_as::<_, DueVisitRow>(
        r#"
        SELECT za.zone_id, s.name AS service_name, p.address, v.scheduled_date
        FROM amc_service_schedules v
        JOIN amc_contract_services s ON s.id = v.contract_service_id
        JOIN properties p ON p.id = v.property_id
        JOIN zone_areas za ON za.area_id = p.area_id AND za.is_active = TRUE
        WHERE v.scheduled_date = $1
          AND v.status = 'scheduled'
          AND za.zone_id = ANY($2)
        ORDER BY p.address
        "#,
    )
    .bind(date)
    .bind(zone_ids)
    .fetch_all(pool)
    .await?;

    Ok(visits)
}

/// Record a payment against an installment.
pub async fn record_payment(
    pool: &PgPool,
    payment_id: Uuid,
    full: bool,
) -> WorkerResult<AmcPaymentSchedule> {
    let status = if full { "paid" } else { "partially_paid" };

    let payment = sqlx::query_as::<_, AmcPaymentSchedule>(
        r#"
        UPDATE amc_payment_schedules
        SET status = $1::amc_payment_status, paid_at = NOW()
        WHERE id = $2 AND status IN ('pending', 'partially_paid', 'overdue')
        RETURNING id, contract_id, installment_no, due_date, amount, status, paid_at, created_at
        "#,
    )
    .bind(status)
    .bind(payment_id)
    .fetch_optional(pool)
    .await?;

    payment.ok_or_else(|| {
        WorkerError::validation(format!(
            "payment {payment_id} not found or already settled"
        ))
    })
}
