//! Service-request creation with zone resolution and auto-assignment.
//!
//! Candidate priority:
//!   1. an active zone member whose department matches the complaint type
//!   2. the zone's active primary head
//!   3. any active head member, primary ranked before secondary
//!
//! A request whose zone cannot be resolved is rejected; unzoned requests
//! are never created. When no candidate is found the request is created
//! NEW and unassigned.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries::{customer, service_request, zone};
use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    CreateServiceRequestRequest, ServiceRequestCreated, ZoneMemberWithEmployee, ZoneRole,
};

/// Pick the best candidate from a zone team for a complaint owned by
/// `department_id`. Pure selection over the already-loaded team.
pub fn pick_assignee(
    team: &[ZoneMemberWithEmployee],
    department_id: Uuid,
) -> Option<(Uuid, String)> {
    let candidates: Vec<_> = team
        .iter()
        .filter(|m| m.is_active && m.employee_is_active)
        .collect();

    if let Some(m) = candidates
        .iter()
        .find(|m| m.department_id == Some(department_id))
    {
        return Some((
            m.employee_id,
            format!("Auto-assigned to {} (department match)", m.full_name),
        ));
    }

    if let Some(m) = candidates.iter().find(|m| m.role == ZoneRole::PrimaryHead) {
        return Some((
            m.employee_id,
            format!("Auto-assigned to zone head {}", m.full_name),
        ));
    }

    candidates
        .iter()
        .filter(|m| m.role.is_head())
        .min_by_key(|m| m.role.rank())
        .map(|m| {
            (
                m.employee_id,
                format!("Auto-assigned to zone head {} (fallback)", m.full_name),
            )
        })
}

pub async fn create_service_request(
    pool: &PgPool,
    request: CreateServiceRequestRequest,
) -> WorkerResult<ServiceRequestCreated> {
    customer::get_customer(pool, request.customer_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| WorkerError::not_found("customer not found"))?;

    let complaint_type = customer::get_complaint_type(pool, request.complaint_type_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| WorkerError::not_found("complaint type not found"))?;

    // Exactly one of legacy property or unit.
    let area_id = match (request.property_id, request.unit_id) {
        (Some(property_id), None) => {
            customer::get_property(pool, property_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| WorkerError::not_found("property not found"))?
                .area_id
        }
        (None, Some(unit_id)) => {
            customer::get_unit(pool, unit_id)
                .await?
                .filter(|u| u.is_active)
                .ok_or_else(|| WorkerError::not_found("unit not found"))?
                .area_id
        }
        _ => {
            return Err(WorkerError::validation(
                "exactly one of propertyId or unitId is required",
            ));
        }
    };

    let zone = match request.zone_id {
        Some(zone_id) => zone::get_zone(pool, zone_id)
            .await?
            .filter(|z| z.is_active)
            .ok_or_else(|| WorkerError::not_found("zone not found"))?,
        None => zone::zone_for_area(pool, area_id).await?.ok_or_else(|| {
            WorkerError::validation("no active zone covers the property's area")
        })?,
    };

    let team = zone::list_team(pool, zone.id).await?;
    let picked = pick_assignee(&team, complaint_type.department_id);
    let (assigned_to_id, assignment_note) = match picked {
        Some((employee_id, note)) => (Some(employee_id), Some(note)),
        None => (None, None),
    };

    let created = service_request::insert_service_request(
        pool,
        service_request::NewServiceRequest {
            customer_id: request.customer_id,
            property_id: request.property_id,
            unit_id: request.unit_id,
            zone_id: zone.id,
            complaint_type_id: complaint_type.id,
            assigned_to_id,
            description: request.description,
            preferred_date: request.preferred_date,
            assignment_note: assignment_note.clone(),
        },
    )
    .await?;

    Ok(ServiceRequestCreated {
        request: created,
        assignment_note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(
        role: ZoneRole,
        department_id: Option<Uuid>,
        employee_is_active: bool,
        name: &str,
    ) -> ZoneMemberWithEmployee {
        ZoneMemberWithEmployee {
            id: Uuid::new_v4(),
            zone_id: Uuid::nil(),
            employee_id: Uuid::new_v4(),
            role,
            is_active: true,
            full_name: name.to_string(),
            email: format!("{}@orbis.example", name.to_lowercase().replace(' ', ".")),
            department_id,
            employee_is_active,
        }
    }

    #[test]
    fn test_department_match_wins_over_heads() {
        let dept = Uuid::new_v4();
        let team = vec![
            member(ZoneRole::PrimaryHead, None, true, "Head One"),
            member(ZoneRole::Technician, Some(dept), true, "Tech Match"),
        ];
        let (picked, note) = pick_assignee(&team, dept).unwrap();
        assert_eq!(picked, team[1].employee_id);
        assert!(note.contains("department match"));
    }

    #[test]
    fn test_inactive_department_match_falls_back_to_primary_head() {
        let dept = Uuid::new_v4();
        let team = vec![
            member(ZoneRole::Technician, Some(dept), false, "Gone Tech"),
            member(ZoneRole::PrimaryHead, None, true, "Head One"),
        ];
        let (picked, _) = pick_assignee(&team, dept).unwrap();
        assert_eq!(picked, team[1].employee_id);
    }

    #[test]
    fn test_secondary_head_fallback_by_rank() {
        let dept = Uuid::new_v4();
        let team = vec![member(ZoneRole::SecondaryHead, None, true, "Second Head")];
        let (picked, note) = pick_assignee(&team, dept).unwrap();
        assert_eq!(picked, team[0].employee_id);
        assert!(note.contains("fallback"));
    }

    #[test]
    fn test_primary_preferred_over_secondary_in_fallback() {
        let dept = Uuid::new_v4();
        let secondary = member(ZoneRole::SecondaryHead, None, true, "Second Head");
        let primary = member(ZoneRole::PrimaryHead, None, true, "First Head");
        // Secondary listed first: rank must decide, not position
        let team = vec![secondary, primary];
        let (picked, _) = pick_assignee(&team, dept).unwrap();
        assert_eq!(picked, team[1].employee_id);
    }

    #[test]
    fn test_no_candidates_yields_none() {
        let dept = Uuid::new_v4();
        let team = vec![member(ZoneRole::Technician, None, true, "Other Tech")];
        // Technician in wrong department, no heads at all
        assert!(pick_assignee(&team, dept).is_none());
    }

    #[test]
    fn test_empty_team_yields_none() {
        assert!(pick_assignee(&[], Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_helpers_never_auto_assigned_without_department_match() {
        let dept = Uuid::new_v4();
        let team = vec![member(ZoneRole::Helper, None, true, "Helper One")];
        assert!(pick_assignee(&team, dept).is_none());
    }
}
