//! Zone coverage resolution.
//!
//! Answers two questions: who is answerable for a zone on a given date
//! (substituting the secondary head while the primary is on approved
//! leave), and how well staffed a zone is over a range. Missing heads are
//! reported through flags and `None`, never as errors - callers check,
//! they don't catch.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries::{leave_request, zone};
use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    ActiveZoneHead, CoverageLevel, FleetCoverage, ListZonesRequest, ZoneCoverageStatus, ZoneRole,
};

/// Resolve the head answerable for a zone on `date` (default today).
pub async fn get_active_zone_head(
    pool: &PgPool,
    zone_id: Uuid,
    date: Option<NaiveDate>,
) -> WorkerResult<ActiveZoneHead> {
    let zone = zone::get_zone(pool, zone_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("zone {zone_id} not found")))?;

    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let primary = zone::get_head(pool, zone.id, ZoneRole::PrimaryHead).await?;
    let secondary = zone::get_head(pool, zone.id, ZoneRole::SecondaryHead).await?;

    let is_primary_on_leave = match &primary {
        Some(head) => !leave_request::approved_overlapping(pool, &[head.id], date, date)
            .await?
            .is_empty(),
        None => false,
    };

    let (active_head, is_using_secondary) = if is_primary_on_leave {
        // Fall back to the secondary; a zone without one is left headless
        // for the day, flagged rather than failed.
        match &secondary {
            Some(sec) => (Some(sec.clone()), true),
            None => (None, false),
        }
    } else {
        (primary.clone(), false)
    };

    Ok(ActiveZoneHead {
        zone_id: zone.id,
        date,
        primary_head: primary,
        secondary_head: secondary,
        active_head,
        is_primary_on_leave,
        is_using_secondary,
    })
}

/// Inputs to the pure classification step.
#[derive(Debug, Clone, Copy)]
pub struct CoverageFacts {
    pub has_primary: bool,
    pub primary_on_leave: bool,
    pub has_secondary: bool,
    pub secondary_on_leave: bool,
    pub crew_on_leave: usize,
}

/// Classify coverage. Head-level problems take precedence; PARTIAL only
/// applies when the head situation is intact.
pub fn classify(facts: CoverageFacts) -> CoverageLevel {
    if facts.primary_on_leave || !facts.has_primary {
        if facts.has_primary && facts.has_secondary && !facts.secondary_on_leave {
            return CoverageLevel::Secondary;
        }
        return CoverageLevel::Critical;
    }
    if facts.crew_on_leave > 0 {
        return CoverageLevel::Partial;
    }
    CoverageLevel::Full
}

/// Coverage classification for a zone over an inclusive date range
/// (defaults: today..today).
pub async fn get_zone_coverage_status(
    pool: &PgPool,
    zone_id: Uuid,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> WorkerResult<ZoneCoverageStatus> {
    let zone = zone::get_zone(pool, zone_id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("zone {zone_id} not found")))?;

    let today = Utc::now().date_naive();
    let start = start_date.unwrap_or(today);
    let end = end_date.unwrap_or(start);
    if start > end {
        return Err(WorkerError::validation("startDate must not be after endDate"));
    }

    let team = zone::list_team(pool, zone.id).await?;
    let primary = team
        .iter()
        .find(|m| m.role == ZoneRole::PrimaryHead && m.employee_is_active);
    let secondary = team
        .iter()
        .find(|m| m.role == ZoneRole::SecondaryHead && m.employee_is_active);
    let crew: Vec<_> = team
        .iter()
        .filter(|m| !m.role.is_head() && m.employee_is_active)
        .collect();

    let all_ids: Vec<Uuid> = team.iter().map(|m| m.employee_id).collect();
    let on_leave: HashSet<Uuid> = leave_request::approved_overlapping(pool, &all_ids, start, end)
        .await?
        .into_iter()
        .map(|r| r.employee_id)
        .collect();

    let members_on_leave: Vec<Uuid> = crew
        .iter()
        .filter(|m| on_leave.contains(&m.employee_id))
        .map(|m| m.employee_id)
        .collect();

    let facts = CoverageFacts {
        has_primary: primary.is_some(),
        primary_on_leave: primary.is_some_and(|m| on_leave.contains(&m.employee_id)),
        has_secondary: secondary.is_some(),
        secondary_on_leave: secondary.is_some_and(|m| on_leave.contains(&m.employee_id)),
        crew_on_leave: members_on_leave.len(),
    };

    Ok(ZoneCoverageStatus {
        zone_id: zone.id,
        zone_name: zone.name,
        level: classify(facts),
        primary_on_leave: facts.primary_on_leave,
        secondary_on_leave: facts.secondary_on_leave,
        has_secondary: facts.has_secondary,
        members_on_leave,
    })
}

/// Coverage for every active zone on a single date, with summary counts.
/// Runs the per-zone lookup for each zone in turn.
pub async fn get_all_zones_coverage_status(
    pool: &PgPool,
    date: Option<NaiveDate>,
) -> WorkerResult<FleetCoverage> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let zones = zone::list_zones(
        pool,
        ListZonesRequest {
            active_only: Some(true),
        },
    )
    .await?;

    let mut statuses = Vec::with_capacity(zones.len());
    for z in &zones {
        statuses.push(get_zone_coverage_status(pool, z.id, Some(date), Some(date)).await?);
    }

    let count = |level: CoverageLevel| {
        statuses.iter().filter(|s| s.level == level).count() as i64
    };

    Ok(FleetCoverage {
        date,
        full_count: count(CoverageLevel::Full),
        secondary_count: count(CoverageLevel::Secondary),
        partial_count: count(CoverageLevel::Partial),
        critical_count: count(CoverageLevel::Critical),
        zones: statuses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> CoverageFacts {
        CoverageFacts {
            has_primary: true,
            primary_on_leave: false,
            has_secondary: true,
            secondary_on_leave: false,
            crew_on_leave: 0,
        }
    }

    #[test]
    fn test_full_when_everyone_present() {
        assert_eq!(classify(facts()), CoverageLevel::Full);
    }

    #[test]
    fn test_secondary_when_primary_on_leave_and_covered() {
        let f = CoverageFacts {
            primary_on_leave: true,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Secondary);
    }

    #[test]
    fn test_critical_when_both_heads_on_leave() {
        let f = CoverageFacts {
            primary_on_leave: true,
            secondary_on_leave: true,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Critical);
    }

    #[test]
    fn test_critical_when_primary_on_leave_without_secondary() {
        let f = CoverageFacts {
            primary_on_leave: true,
            has_secondary: false,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Critical);
    }

    #[test]
    fn test_critical_when_no_primary_assigned() {
        let f = CoverageFacts {
            has_primary: false,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Critical);
    }

    #[test]
    fn test_partial_when_crew_member_on_leave() {
        let f = CoverageFacts {
            crew_on_leave: 2,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Partial);
    }

    #[test]
    fn test_head_issue_takes_precedence_over_partial() {
        let f = CoverageFacts {
            primary_on_leave: true,
            crew_on_leave: 3,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Secondary);
    }

    #[test]
    fn test_secondary_only_on_leave_is_still_full() {
        // The secondary is a head, not crew; with the primary present the
        // zone is fully covered.
        let f = CoverageFacts {
            secondary_on_leave: true,
            ..facts()
        };
        assert_eq!(classify(f), CoverageLevel::Full);
    }
}
