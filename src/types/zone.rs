//! Territory types: governorates, areas, zones, zone membership and
//! coverage reporting.
//!
//! Zone membership is the single source of truth for headship: the active
//! member with role `primary_head` IS the zone's primary head. There are
//! no head pointer columns on the zone itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::Employee;

/// Governorate entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Governorate {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Area entity - the geographic unit properties are registered against
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub governorate_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Zone entity - a service territory grouping areas
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub governorate_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership role within a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "zone_role", rename_all = "snake_case")]
pub enum ZoneRole {
    PrimaryHead,
    SecondaryHead,
    Technician,
    Helper,
}

impl ZoneRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneRole::PrimaryHead => "primary_head",
            ZoneRole::SecondaryHead => "secondary_head",
            ZoneRole::Technician => "technician",
            ZoneRole::Helper => "helper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "primary_head" => Some(ZoneRole::PrimaryHead),
            "secondary_head" => Some(ZoneRole::SecondaryHead),
            "technician" => Some(ZoneRole::Technician),
            "helper" => Some(ZoneRole::Helper),
            _ => None,
        }
    }

    /// Explicit fallback rank for assignment: lower wins. Does not depend
    /// on enum name ordering.
    pub fn rank(&self) -> i32 {
        match self {
            ZoneRole::PrimaryHead => 0,
            ZoneRole::SecondaryHead => 1,
            ZoneRole::Technician => 2,
            ZoneRole::Helper => 3,
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, ZoneRole::PrimaryHead | ZoneRole::SecondaryHead)
    }
}

/// Zone membership row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMember {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub employee_id: Uuid,
    pub role: ZoneRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Zone membership row joined with employee details, for team listings
/// and candidate selection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMemberWithEmployee {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub employee_id: Uuid,
    pub role: ZoneRole,
    pub is_active: bool,
    pub full_name: String,
    pub email: String,
    pub department_id: Option<Uuid>,
    pub employee_is_active: bool,
}

/// Area-to-zone mapping. At most one active zone per area.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZoneArea {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub area_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ==========================================================================
// Requests
// ==========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGovernorateRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaRequest {
    pub name: String,
    pub governorate_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    pub name: String,
    pub governorate_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZoneRequest {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListZonesRequest {
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetZoneRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignZoneMemberRequest {
    pub zone_id: Uuid,
    pub employee_id: Uuid,
    pub role: ZoneRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveZoneMemberRequest {
    pub zone_id: Uuid,
    pub employee_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapZoneAreaRequest {
    pub zone_id: Uuid,
    pub area_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTeamRequest {
    pub zone_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveHeadRequest {
    pub zone_id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCoverageRequest {
    pub zone_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AllZonesCoverageRequest {
    pub date: Option<NaiveDate>,
}

// ==========================================================================
// Coverage responses
// ==========================================================================

/// Who is answerable for a zone on a given date, accounting for approved
/// leave of the primary head.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveZoneHead {
    pub zone_id: Uuid,
    pub date: NaiveDate,
    pub primary_head: Option<Employee>,
    pub secondary_head: Option<Employee>,
    /// None when the zone has no heads, or the primary is on leave with no
    /// secondary to fall back to. Absence is data, not an error.
    pub active_head: Option<Employee>,
    pub is_primary_on_leave: bool,
    pub is_using_secondary: bool,
}

/// Coverage classification for a zone over a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageLevel {
    Full,
    Secondary,
    Partial,
    Critical,
}

impl CoverageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageLevel::Full => "FULL",
            CoverageLevel::Secondary => "SECONDARY",
            CoverageLevel::Partial => "PARTIAL",
            CoverageLevel::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCoverageStatus {
    pub zone_id: Uuid,
    pub zone_name: String,
    pub level: CoverageLevel,
    pub primary_on_leave: bool,
    pub secondary_on_leave: bool,
    pub has_secondary: bool,
    /// Employee ids of technicians/helpers on approved leave in the range
    pub members_on_leave: Vec<Uuid>,
}

/// Fleet-wide coverage summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetCoverage {
    pub date: NaiveDate,
    pub zones: Vec<ZoneCoverageStatus>,
    pub full_count: i64,
    pub secondary_count: i64,
    pub partial_count: i64,
    pub critical_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_role_rank_is_explicit() {
        assert!(ZoneRole::PrimaryHead.rank() < ZoneRole::SecondaryHead.rank());
        assert!(ZoneRole::SecondaryHead.rank() < ZoneRole::Technician.rank());
    }

    #[test]
    fn test_zone_role_round_trip() {
        for role in [
            ZoneRole::PrimaryHead,
            ZoneRole::SecondaryHead,
            ZoneRole::Technician,
            ZoneRole::Helper,
        ] {
            assert_eq!(ZoneRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(ZoneRole::from_str("supervisor"), None);
    }

    #[test]
    fn test_assign_member_request_deserialize() {
        let json = r#"{
            "zoneId": "123e4567-e89b-12d3-a456-426614174000",
            "employeeId": "123e4567-e89b-12d3-a456-426614174001",
            "role": "secondary_head"
        }"#;
        let request: AssignZoneMemberRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, ZoneRole::SecondaryHead);
    }

    #[test]
    fn test_coverage_level_serializes_screaming() {
        let json = serde_json::to_string(&CoverageLevel::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
