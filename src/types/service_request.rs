//! Service request types and status transition graph.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Service request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "service_request_status", rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    New,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
    Closed,
}

impl ServiceRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRequestStatus::New => "new",
            ServiceRequestStatus::Assigned => "assigned",
            ServiceRequestStatus::InProgress => "in_progress",
            ServiceRequestStatus::OnHold => "on_hold",
            ServiceRequestStatus::Completed => "completed",
            ServiceRequestStatus::Cancelled => "cancelled",
            ServiceRequestStatus::Closed => "closed",
        }
    }

    /// Whether `self -> next` is a legal lifecycle move.
    pub fn can_transition_to(&self, next: ServiceRequestStatus) -> bool {
        use ServiceRequestStatus::*;
        matches!(
            (self, next),
            (New, Assigned)
                | (New, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Cancelled)
                | (InProgress, OnHold)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (OnHold, InProgress)
                | (OnHold, Cancelled)
                | (Completed, Closed)
        )
    }
}

/// Service request entity. References exactly one of a legacy property or
/// a unit; the zone is mandatory and resolved at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub property_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub zone_id: Uuid,
    pub complaint_type_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub status: ServiceRequestStatus,
    pub description: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Timeline entry recording a status change or assignment decision
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub status: ServiceRequestStatus,
    pub note: Option<String>,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ==========================================================================
// Requests
// ==========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestRequest {
    pub customer_id: Uuid,
    pub property_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    /// Explicit zone override; normally resolved from the property's area
    pub zone_id: Option<Uuid>,
    pub complaint_type_id: Uuid,
    pub description: Option<String>,
    pub preferred_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetServiceRequestRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListServiceRequestsRequest {
    pub zone_id: Option<Uuid>,
    pub status: Option<ServiceRequestStatus>,
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequestStatusRequest {
    pub id: Uuid,
    pub status: ServiceRequestStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignServiceRequestRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub note: Option<String>,
}

/// Creation response carrying the request plus how (or whether) it was
/// auto-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestCreated {
    pub request: ServiceRequest,
    pub assignment_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ServiceRequestStatus::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(New.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Closed));
    }

    #[test]
    fn test_hold_round_trip() {
        assert!(InProgress.can_transition_to(OnHold));
        assert!(OnHold.can_transition_to(InProgress));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        assert!(!New.can_transition_to(Completed));
        assert!(!Closed.can_transition_to(New));
        assert!(!Cancelled.can_transition_to(Assigned));
        assert!(!Completed.can_transition_to(InProgress));
        // No path back to new from anywhere
        for s in [Assigned, InProgress, OnHold, Completed, Cancelled, Closed] {
            assert!(!s.can_transition_to(New));
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
