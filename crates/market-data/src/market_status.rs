//! Exchange session hours.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;

use crate::models::MarketStatus;

/// Exchange local time zone (IST, UTC+05:30).
pub const MARKET_TZ: Tz = chrono_tz::Asia::Kolkata;

/// 09:15 local, in minutes since midnight.
const SESSION_OPEN_MINUTE: u32 = 9 * 60 + 15;
/// 15:30 local, inclusive.
const SESSION_CLOSE_MINUTE: u32 = 15 * 60 + 30;

/// `instant` expressed in exchange local time.
pub fn to_market_time(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&MARKET_TZ).fixed_offset()
}

/// Whether the regular session is running at `instant`.
///
/// Open Monday to Friday, 09:15 through 15:30 local at minute resolution.
/// Exchange holidays are not modelled.
pub fn is_market_open(instant: DateTime<Utc>) -> bool {
    let local = instant.with_timezone(&MARKET_TZ);
    let is_weekday = local.weekday().num_days_from_monday() < 5;
    let minute_of_day = local.hour() * 60 + local.minute();
    is_weekday && (SESSION_OPEN_MINUTE..=SESSION_CLOSE_MINUTE).contains(&minute_of_day)
}

pub fn market_status_at(instant: DateTime<Utc>) -> MarketStatus {
    let local = instant.with_timezone(&MARKET_TZ);
    let is_open = is_market_open(instant);
    MarketStatus {
        is_open,
        timestamp: local.fixed_offset(),
        day: local.format("%A").to_string(),
        message: if is_open {
            "Market is open".to_string()
        } else {
            "Market is closed".to_string()
        },
    }
}
