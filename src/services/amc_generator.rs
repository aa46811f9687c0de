//! AMC visit and payment schedule generation.
//!
//! Visits use a fixed-interval walk: `floor(365 / visits_per_year)` days
//! between visits, regardless of month boundaries. This approximation is
//! intentional; installment due dates, by contrast, move by calendar
//! months (with end-of-month clamping).
//!
//! Regeneration is delete-then-insert and only touches rows still in
//! their initial state: SCHEDULED visits and PENDING installments.
//! Completed visits and settled payments survive.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries::amc;
use crate::error::{WorkerError, WorkerResult};
use crate::types::{AmcContract, AmcGenerationResult, AmcPaymentTerms, AmcStatus};

/// Visit dates for one service line: fixed stride from the start date,
/// inclusive of any date landing on the end date.
pub fn visit_dates(start: NaiveDate, end: NaiveDate, visits_per_year: i64) -> Vec<NaiveDate> {
    let interval_days = (365 / visits_per_year).max(1);
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        cursor = cursor + chrono::Duration::days(interval_days);
    }
    dates
}

/// Whole months spanned by the contract term, counting a trailing partial
/// month as one. Never less than one.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    use chrono::Datelike;
    let whole =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let months = if end.day() > start.day() { whole + 1 } else { whole };
    months.max(1) as u32
}

/// Equal installments over the contract term. The amount is rounded to
/// two decimals; the final installment is not adjusted for the rounding
/// remainder.
pub fn installment_plan(
    start: NaiveDate,
    end: NaiveDate,
    contract_value: Decimal,
    terms: AmcPaymentTerms,
) -> Vec<(i32, NaiveDate, Decimal)> {
    let interval_months = terms.interval_months();
    let months = months_between(start, end);
    let total_installments = months.div_ceil(interval_months);

    let amount = (contract_value / Decimal::from(total_installments)).round_dp(2);

    (0..total_installments)
        .map(|i| {
            let due = start
                .checked_add_months(Months::new(i * interval_months))
                .unwrap_or(end);
            (i as i32 + 1, due, amount)
        })
        .collect()
}

async fn active_contract(pool: &PgPool, contract_id: Uuid) -> WorkerResult<AmcContract> {
    let contract = amc::get_contract(pool, contract_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("contract {contract_id} not found")))?;
    if contract.status != AmcStatus::Active {
        return Err(WorkerError::validation(format!(
            "schedules can only be generated for active contracts (current: {})",
            contract.status.as_str()
        )));
    }
    Ok(contract)
}

/// Regenerate visit schedules for every (service x property) pair.
pub async fn generate_schedules(pool: &PgPool, contract_id: Uuid) -> WorkerResult<i64> {
    let contract = active_contract(pool, contract_id).await?;

    let services = amc::list_services(pool, contract.id).await?;
    let properties = amc::list_properties(pool, contract.id).await?;

    let mut visits: Vec<(Uuid, Uuid, NaiveDate)> = Vec::new();
    for service in &services {
        let dates = visit_dates(
            contract.start_date,
            contract.end_date,
            service.frequency.visits_per_year(),
        );
        for property in &properties {
            for date in &dates {
                visits.push((service.id, property.property_id, *date));
            }
        }
    }

    let mut tx = pool.begin().await?;
    amc::delete_scheduled_visits(&mut tx, contract.id).await?;
    let created = amc::insert_visits(&mut tx, contract.id, &visits).await?;
    tx.commit().await?;

    Ok(created as i64)
}

/// Regenerate the payment plan.
pub async fn generate_payment_schedule(pool: &PgPool, contract_id: Uuid) -> WorkerResult<i64> {
    let contract = active_contract(pool, contract_id).await?;

    let installments = installment_plan(
        contract.start_date,
        contract.end_date,
        contract.contract_value,
        contract.payment_terms,
    );

    let mut tx = pool.begin().await?;
    amc::delete_pending_payments(&mut tx, contract.id).await?;
    let created = amc::insert_payments(&mut tx, contract.id, &installments).await?;
    tx.commit().await?;

    Ok(created as i64)
}

/// DRAFT -> ACTIVE, then generate both schedules.
pub async fn activate_contract(
    pool: &PgPool,
    contract_id: Uuid,
) -> WorkerResult<AmcGenerationResult> {
    let contract = amc::get_contract(pool, contract_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("contract {contract_id} not found")))?;
    if contract.status != AmcStatus::Draft {
        return Err(WorkerError::validation(format!(
            "only draft contracts can be activated (current: {})",
            contract.status.as_str()
        )));
    }

    amc::set_status(pool, contract.id, AmcStatus::Active).await?;

    let visits_created = generate_schedules(pool, contract.id).await?;
    let installments_created = generate_payment_schedule(pool, contract.id).await?;

    Ok(AmcGenerationResult {
        contract_id: contract.id,
        visits_created,
        installments_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_visits_over_a_year() {
        // floor(365/12) = 30-day stride over a 365-day span:
        // floor(364/30) + 1 = 13 visits
        let dates = visit_dates(d(2026, 1, 1), d(2026, 12, 31), 12);
        assert_eq!(dates.len(), 13);
        assert_eq!(dates[0], d(2026, 1, 1));
        assert_eq!(dates[1], d(2026, 1, 31));
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 30);
        }
    }

    #[test]
    fn test_weekly_visits_stride_seven_days() {
        let dates = visit_dates(d(2026, 3, 1), d(2026, 3, 31), 52);
        // 7-day stride: Mar 1, 8, 15, 22, 29
        assert_eq!(dates.len(), 5);
        assert_eq!(*dates.last().unwrap(), d(2026, 3, 29));
    }

    #[test]
    fn test_annual_visit_single_date() {
        let dates = visit_dates(d(2026, 1, 1), d(2026, 12, 31), 1);
        assert_eq!(dates, vec![d(2026, 1, 1)]);
    }

    #[test]
    fn test_visit_dates_never_pass_end() {
        let dates = visit_dates(d(2026, 1, 1), d(2026, 2, 15), 12);
        assert!(dates.iter().all(|&dt| dt <= d(2026, 2, 15)));
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_months_between_full_year() {
        assert_eq!(months_between(d(2026, 1, 1), d(2026, 12, 31)), 12);
        assert_eq!(months_between(d(2026, 1, 1), d(2027, 1, 1)), 12);
    }

    #[test]
    fn test_months_between_partial_month_rounds_up() {
        assert_eq!(months_between(d(2026, 1, 15), d(2026, 3, 20)), 3);
    }

    #[test]
    fn test_months_between_same_month_is_one() {
        assert_eq!(months_between(d(2026, 5, 1), d(2026, 5, 20)), 1);
    }

    #[test]
    fn test_quarterly_installments_over_a_year() {
        let plan = installment_plan(
            d(2026, 1, 1),
            d(2026, 12, 31),
            Decimal::new(240000, 2), // 2400.00
            AmcPaymentTerms::Quarterly,
        );
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0], (1, d(2026, 1, 1), Decimal::new(60000, 2)));
        assert_eq!(plan[1].1, d(2026, 4, 1));
        assert_eq!(plan[3].1, d(2026, 10, 1));
    }

    #[test]
    fn test_monthly_installments_clamp_end_of_month() {
        let plan = installment_plan(
            d(2026, 1, 31),
            d(2026, 12, 30),
            Decimal::from(1200),
            AmcPaymentTerms::Monthly,
        );
        // Jan 31 + 1 month clamps to Feb 28
        assert_eq!(plan[1].1, d(2026, 2, 28));
    }

    #[test]
    fn test_rounding_remainder_left_on_last_installment() {
        let plan = installment_plan(
            d(2026, 1, 1),
            d(2026, 12, 31),
            Decimal::from(1000),
            AmcPaymentTerms::Quarterly,
        );
        // 1000 / 4 = 250 exactly; but 1000/12 would not be - verify the
        // equal-amount policy with a non-dividing value
        assert!(plan.iter().all(|(_, _, a)| *a == Decimal::from(250)));

        let monthly = installment_plan(
            d(2026, 1, 1),
            d(2026, 12, 31),
            Decimal::from(1000),
            AmcPaymentTerms::Monthly,
        );
        assert_eq!(monthly.len(), 12);
        // Every installment is the same rounded figure; no adjustment on
        // the last one.
        assert!(monthly.iter().all(|(_, _, a)| *a == Decimal::new(8333, 2)));
    }
}
