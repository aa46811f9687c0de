//! Notification jobs: zone-head daily summaries and the queued
//! notification dispatcher.
//!
//! The evening summary covers tomorrow's workload, the morning summary
//! today's. A head with nothing scheduled gets no email. Delivery
//! failures are logged per recipient and never abort the batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::queries::{amc, employee, notification, service_request, zone};
use crate::services::email_sender::EmailSender;
use crate::services::email_templates::{
    DailySummaryEmail, QueuedNotificationEmail, SummaryKind, SummaryLine,
};
use crate::services::scheduler::JobHandler;

/// How many queued notifications one dispatch run will attempt.
const DISPATCH_BATCH_SIZE: i64 = 100;

struct HeadWorkload {
    full_name: String,
    email: String,
    zones: Vec<(Uuid, String)>,
}

/// Daily summary job for zone heads. `day_offset` selects the target day
/// relative to the local date (0 = today, 1 = tomorrow).
pub struct ZoneHeadSummaryJob {
    name: &'static str,
    day_offset: i64,
    pool: PgPool,
    sender: Arc<dyn EmailSender>,
}

impl ZoneHeadSummaryJob {
    pub fn evening(pool: PgPool, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            name: "zone-head-evening-summary",
            day_offset: 1,
            pool,
            sender,
        }
    }

    pub fn morning(pool: PgPool, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            name: "zone-head-morning-summary",
            day_offset: 0,
            pool,
            sender,
        }
    }

    async fn workload_lines(
        &self,
        zones: &[(Uuid, String)],
        date: NaiveDate,
    ) -> Result<Vec<SummaryLine>> {
        let zone_ids: Vec<Uuid> = zones.iter().map(|(id, _)| *id).collect();
        let zone_name = |id: Uuid| {
            zones
                .iter()
                .find(|(zid, _)| *zid == id)
                .map(|(_, name)| name.clone())
                .unwrap_or_default()
        };

        let mut lines = Vec::new();

        for request in service_request::upcoming_in_zones(&self.pool, &zone_ids, date).await? {
            lines.push(SummaryLine {
                zone_name: zone_name(request.zone_id),
                kind: SummaryKind::ServiceRequest,
                detail: request
                    .description
                    .unwrap_or_else(|| format!("Request {}", request.id)),
            });
        }

        for visit in amc::due_visits_in_zones(&self.pool, &zone_ids, date).await? {
            lines.push(SummaryLine {
                zone_name: zone_name(visit.zone_id),
                kind: SummaryKind::AmcVisit,
                detail: format!("{} at {}", visit.service_name, visit.address),
            });
        }

        Ok(lines)
    }
}

#[async_trait]
impl JobHandler for ZoneHeadSummaryJob {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self) -> Result<String> {
        let date = Local::now().date_naive() + Duration::days(self.day_offset);

        // One workload per head, however many zones they carry.
        let mut heads: BTreeMap<Uuid, HeadWorkload> = BTreeMap::new();
        for row in zone::list_active_heads(&self.pool).await? {
            heads
                .entry(row.employee_id)
                .or_insert_with(|| HeadWorkload {
                    full_name: row.full_name.clone(),
                    email: row.email.clone(),
                    zones: Vec::new(),
                })
                .zones
                .push((row.zone_id, row.zone_name));
        }

        let mut sent = 0usize;
        let mut skipped = 0usize;
        for workload in heads.values() {
            let lines = self.workload_lines(&workload.zones, date).await?;
            if lines.is_empty() {
                skipped += 1;
                continue;
            }

            let email = DailySummaryEmail {
                to: &workload.email,
                head_name: &workload.full_name,
                date,
                lines: &lines,
            }
            .render();

            if let Err(e) = self.sender.send(email).await {
                error!(recipient = %workload.email, "Failed to send summary: {e:#}");
                continue;
            }
            sent += 1;
        }

        Ok(format!(
            "sent {sent} summaries for {date}, {skipped} heads had nothing scheduled"
        ))
    }
}

/// Delivers due rows from the scheduled notification queue.
pub struct NotificationDispatchJob {
    pool: PgPool,
    sender: Arc<dyn EmailSender>,
}

impl NotificationDispatchJob {
    pub fn new(pool: PgPool, sender: Arc<dyn EmailSender>) -> Self {
        Self { pool, sender }
    }
}

#[async_trait]
impl JobHandler for NotificationDispatchJob {
    fn name(&self) -> &'static str {
        "notification-dispatch"
    }

    async fn run(&self) -> Result<String> {
        let due = notification::due(&self.pool, Utc::now(), DISPATCH_BATCH_SIZE).await?;
        let total = due.len();

        let mut sent = 0usize;
        for item in due {
            let recipient = match employee::get_employee(&self.pool, item.recipient_id).await? {
                Some(e) if e.is_active => e,
                _ => {
                    warn!(notification = %item.id, "Recipient missing or inactive");
                    notification::mark_failed(&self.pool, item.id, "recipient missing or inactive")
                        .await?;
                    continue;
                }
            };

            let email = QueuedNotificationEmail {
                to: &recipient.email,
                subject: &item.subject,
                body: &item.body,
            }
            .render();

            match self.sender.send(email).await {
                Ok(()) => {
                    notification::mark_sent(&self.pool, item.id).await?;
                    sent += 1;
                }
                Err(e) => {
                    error!(notification = %item.id, "Delivery failed: {e:#}");
                    notification::mark_failed(&self.pool, item.id, &e.to_string()).await?;
                }
            }
        }

        Ok(format!("dispatched {sent}/{total} due notifications"))
    }
}
