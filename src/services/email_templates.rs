//! Email templates for zone-head summaries and queued notifications.
//!
//! Each template renders to an `EmailMessage` ready for `EmailSender::send`.

use chrono::NaiveDate;

use crate::services::email_sender::EmailMessage;

/// One line of a head's daily workload.
pub struct SummaryLine {
    pub zone_name: String,
    pub kind: SummaryKind,
    pub detail: String,
}

pub enum SummaryKind {
    ServiceRequest,
    AmcVisit,
}

impl SummaryKind {
    fn label(&self) -> &'static str {
        match self {
            SummaryKind::ServiceRequest => "Service request",
            SummaryKind::AmcVisit => "AMC visit",
        }
    }
}

/// Daily task summary sent to a zone head.
pub struct DailySummaryEmail<'a> {
    pub to: &'a str,
    pub head_name: &'a str,
    pub date: NaiveDate,
    pub lines: &'a [SummaryLine],
}

impl<'a> DailySummaryEmail<'a> {
    pub fn render(&self) -> EmailMessage {
        let subject = format!(
            "Your zone schedule for {} ({} items)",
            self.date.format("%d %b %Y"),
            self.lines.len()
        );

        let mut html_items = String::new();
        let mut text_items = String::new();
        for line in self.lines {
            html_items.push_str(&format!(
                "<li><strong>{}</strong> - {}: {}</li>\n",
                line.zone_name,
                line.kind.label(),
                line.detail
            ));
            text_items.push_str(&format!(
                "- {} / {}: {}\n",
                line.zone_name,
                line.kind.label(),
                line.detail
            ));
        }

        let html = format!(
            r#"<p>Hello {name},</p>
<p>Scheduled work in your zones on {date}:</p>
<ul>
{items}</ul>
<p>- Orbis</p>"#,
            name = self.head_name,
            date = self.date.format("%d %b %Y"),
            items = html_items,
        );

        let text = format!(
            "Hello {},\n\nScheduled work in your zones on {}:\n{}\n- Orbis",
            self.head_name,
            self.date.format("%d %b %Y"),
            text_items,
        );

        EmailMessage {
            to: self.to.to_string(),
            subject,
            html,
            text,
        }
    }
}

/// A queued notification delivered verbatim by the dispatch job.
pub struct QueuedNotificationEmail<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

impl<'a> QueuedNotificationEmail<'a> {
    pub fn render(&self) -> EmailMessage {
        EmailMessage {
            to: self.to.to_string(),
            subject: self.subject.to_string(),
            html: format!("<p>{}</p>", self.body.replace('\n', "<br>")),
            text: self.body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_summary_lists_all_lines() {
        let lines = vec![
            SummaryLine {
                zone_name: "Salmiya North".to_string(),
                kind: SummaryKind::ServiceRequest,
                detail: "AC not cooling, Marina Tower B 1204".to_string(),
            },
            SummaryLine {
                zone_name: "Salmiya North".to_string(),
                kind: SummaryKind::AmcVisit,
                detail: "AC maintenance at Block 4".to_string(),
            },
        ];
        let email = DailySummaryEmail {
            to: "head@orbis.example",
            head_name: "Fatima",
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            lines: &lines,
        }
        .render();

        assert!(email.subject.contains("2 items"));
        assert!(email.subject.contains("03 Mar 2026"));
        assert!(email.text.contains("AC not cooling"));
        assert!(email.html.contains("<li><strong>Salmiya North</strong>"));
        assert!(email.html.contains("AMC visit"));
    }

    #[test]
    fn test_queued_notification_preserves_body() {
        let email = QueuedNotificationEmail {
            to: "tech@orbis.example",
            subject: "Contract renewal due",
            body: "Contract AMC-2026-0042 expires in 30 days.\nPlease follow up.",
        }
        .render();

        assert_eq!(email.subject, "Contract renewal due");
        assert!(email.html.contains("<br>"));
        assert!(email.text.contains("expires in 30 days"));
    }
}
