use std::time::Duration;

use chrono::NaiveTime;

/// Local wall-clock time of the evening zone-head summary (covers tomorrow)
pub fn evening_summary_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).expect("valid static evening summary time")
}

/// Local wall-clock time of the morning zone-head summary (covers today)
pub fn morning_summary_time() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).expect("valid static morning summary time")
}

/// How often the queued-notification dispatcher runs
pub const NOTIFICATION_DISPATCH_INTERVAL: Duration = Duration::from_secs(5 * 60);
