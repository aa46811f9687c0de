//! Leave tracking types: leave types, requests, and per-year balances.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Leave type definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: Uuid,
    pub name: String,
    /// Yearly entitlement seeded into lazily created balances
    pub default_days: i32,
    pub max_consecutive_days: Option<i32>,
    pub requires_approval: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Leave request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "leave_status", rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

/// Leave request entity. Date range is inclusive on both ends.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub covering_employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-employee, per-type, per-year day counters.
/// available = total + carry_over - used - pending
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub year: i32,
    pub total_days: i32,
    pub used_days: i32,
    pub pending_days: i32,
    pub carry_over_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn available_days(&self) -> i32 {
        self.total_days + self.carry_over_days - self.used_days - self.pending_days
    }
}

// ==========================================================================
// Requests
// ==========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveTypeRequest {
    pub name: String,
    pub default_days: i32,
    pub max_consecutive_days: Option<i32>,
    pub requires_approval: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveTypeRequest {
    pub id: Uuid,
    pub default_days: Option<i32>,
    pub max_consecutive_days: Option<i32>,
    pub requires_approval: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequestRequest {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub covering_employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveRequestRequest {
    pub id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub covering_employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLeaveRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectLeaveRequest {
    pub id: Uuid,
    pub rejection_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelLeaveRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLeaveRequestRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListLeaveRequestsRequest {
    pub employee_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLeaveBalancesRequest {
    pub employee_id: Uuid,
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(total: i32, used: i32, pending: i32, carry: i32) -> LeaveBalance {
        LeaveBalance {
            id: Uuid::nil(),
            employee_id: Uuid::nil(),
            leave_type_id: Uuid::nil(),
            year: 2026,
            total_days: total,
            used_days: used,
            pending_days: pending,
            carry_over_days: carry,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_days_formula() {
        assert_eq!(balance(21, 5, 3, 2).available_days(), 15);
        assert_eq!(balance(21, 0, 0, 0).available_days(), 21);
    }

    #[test]
    fn test_available_days_can_report_zero() {
        assert_eq!(balance(10, 7, 3, 0).available_days(), 0);
    }

    #[test]
    fn test_create_leave_request_deserialize() {
        let json = r#"{
            "employeeId": "123e4567-e89b-12d3-a456-426614174000",
            "leaveTypeId": "123e4567-e89b-12d3-a456-426614174001",
            "startDate": "2026-09-01",
            "endDate": "2026-09-05",
            "reason": "family travel"
        }"#;
        let request: CreateLeaveRequestRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.start_date,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert!(request.covering_employee_id.is_none());
    }

    #[test]
    fn test_leave_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Approved).unwrap(),
            "\"approved\""
        );
    }
}
