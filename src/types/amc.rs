//! Annual maintenance contract types: contract header, covered properties,
//! service lines, generated visit schedules and payment installments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Contract lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "amc_status", rename_all = "snake_case")]
pub enum AmcStatus {
    Draft,
    Active,
    Expired,
    Cancelled,
}

impl AmcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmcStatus::Draft => "draft",
            AmcStatus::Active => "active",
            AmcStatus::Expired => "expired",
            AmcStatus::Cancelled => "cancelled",
        }
    }
}

/// Visit frequency for a contract service line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "amc_frequency", rename_all = "snake_case")]
pub enum AmcFrequency {
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl AmcFrequency {
    pub fn visits_per_year(&self) -> i64 {
        match self {
            AmcFrequency::Weekly => 52,
            AmcFrequency::Monthly => 12,
            AmcFrequency::Quarterly => 4,
            AmcFrequency::SemiAnnual => 2,
            AmcFrequency::Annual => 1,
        }
    }
}

/// Payment terms: how many installments per contract year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "amc_payment_terms", rename_all = "snake_case")]
pub enum AmcPaymentTerms {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl AmcPaymentTerms {
    pub fn installments_per_year(&self) -> u32 {
        match self {
            AmcPaymentTerms::Monthly => 12,
            AmcPaymentTerms::Quarterly => 4,
            AmcPaymentTerms::SemiAnnual => 2,
            AmcPaymentTerms::Annual => 1,
        }
    }

    /// Months between consecutive installments.
    pub fn interval_months(&self) -> u32 {
        12 / self.installments_per_year()
    }
}

/// Scheduled-visit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "amc_visit_status", rename_all = "snake_case")]
pub enum AmcVisitStatus {
    Scheduled,
    Completed,
    Missed,
    Cancelled,
}

/// Payment installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "amc_payment_status", rename_all = "snake_case")]
pub enum AmcPaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
}

/// Contract header
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AmcContract {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub contract_no: String,
    pub status: AmcStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contract_value: Decimal,
    pub payment_terms: AmcPaymentTerms,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A property covered by the contract
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AmcContractProperty {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub property_id: Uuid,
}

/// A service line (e.g. "AC maintenance", monthly)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AmcContractService {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub name: String,
    pub frequency: AmcFrequency,
}

/// A generated visit for one service line at one property
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AmcServiceSchedule {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub contract_service_id: Uuid,
    pub property_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub status: AmcVisitStatus,
    pub created_at: DateTime<Utc>,
}

/// A generated payment installment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AmcPaymentSchedule {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub installment_no: i32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: AmcPaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ==========================================================================
// Requests
// ==========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmcServiceLineInput {
    pub name: String,
    pub frequency: AmcFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAmcContractRequest {
    pub customer_id: Uuid,
    pub contract_no: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contract_value: Decimal,
    pub payment_terms: AmcPaymentTerms,
    pub property_ids: Vec<Uuid>,
    pub services: Vec<AmcServiceLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAmcContractRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListAmcContractsRequest {
    pub customer_id: Option<Uuid>,
    pub status: Option<AmcStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateAmcContractRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAmcSchedulesRequest {
    pub contract_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAmcPaymentRequest {
    pub payment_id: Uuid,
    /// Paid in full when true, partially otherwise
    pub full: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAmcContractRequest {
    pub id: Uuid,
}

/// Contract with its child collections, for get responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmcContractDetail {
    pub contract: AmcContract,
    pub properties: Vec<AmcContractProperty>,
    pub services: Vec<AmcContractService>,
    pub schedules: Vec<AmcServiceSchedule>,
    pub payments: Vec<AmcPaymentSchedule>,
}

/// Result of schedule/payment generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmcGenerationResult {
    pub contract_id: Uuid,
    pub visits_created: i64,
    pub installments_created: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_visit_counts() {
        assert_eq!(AmcFrequency::Weekly.visits_per_year(), 52);
        assert_eq!(AmcFrequency::Monthly.visits_per_year(), 12);
        assert_eq!(AmcFrequency::Annual.visits_per_year(), 1);
    }

    #[test]
    fn test_payment_terms_intervals() {
        assert_eq!(AmcPaymentTerms::Monthly.interval_months(), 1);
        assert_eq!(AmcPaymentTerms::Quarterly.interval_months(), 3);
        assert_eq!(AmcPaymentTerms::SemiAnnual.interval_months(), 6);
        assert_eq!(AmcPaymentTerms::Annual.interval_months(), 12);
    }

    #[test]
    fn test_create_contract_request_deserialize() {
        let json = r#"{
            "customerId": "123e4567-e89b-12d3-a456-426614174000",
            "contractNo": "AMC-2026-0042",
            "startDate": "2026-01-01",
            "endDate": "2026-12-31",
            "contractValue": "2400.00",
            "paymentTerms": "quarterly",
            "propertyIds": ["123e4567-e89b-12d3-a456-426614174001"],
            "services": [{"name": "AC maintenance", "frequency": "monthly"}]
        }"#;
        let request: CreateAmcContractRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.payment_terms, AmcPaymentTerms::Quarterly);
        assert_eq!(request.services[0].frequency, AmcFrequency::Monthly);
        assert_eq!(request.contract_value, Decimal::new(240000, 2));
    }
}
