//! Customer, property, unit and complaint-type types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Legacy property record. New stock is registered as units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub area_id: Uuid,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unit entity - a flat/apartment within a building
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub area_id: Uuid,
    pub building: String,
    pub unit_no: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Complaint type - categorizes a service request and links it to the
/// department responsible for handling it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintType {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub customer_id: Uuid,
    pub area_id: Uuid,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    pub customer_id: Uuid,
    pub area_id: Uuid,
    pub building: String,
    pub unit_no: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintTypeRequest {
    pub name: String,
    pub department_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_unit_request_deserialize() {
        let json = r#"{
            "customerId": "123e4567-e89b-12d3-a456-426614174000",
            "areaId": "123e4567-e89b-12d3-a456-426614174001",
            "building": "Marina Tower B",
            "unitNo": "1204"
        }"#;
        let request: CreateUnitRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.unit_no, "1204");
        assert_eq!(request.building, "Marina Tower B");
    }
}
