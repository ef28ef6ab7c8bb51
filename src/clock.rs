//! Session clock labels. The stamp locale is fixed Indonesian with the
//! Jakarta timezone (the "GMT +07:00" suffix rendered by theme1).

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::model::TimeStamp;

pub const JAKARTA: Tz = chrono_tz::Asia::Jakarta;
pub const UTC_OFFSET_LABEL: &str = "GMT +07:00";

pub const DAY_NAMES: [&str; 7] = [
    "Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu",
];
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agt", "Sep", "Okt", "Nov", "Des",
];

pub fn now_jakarta() -> DateTime<Tz> {
    Utc::now().with_timezone(&JAKARTA)
}

/// "Senin, 09/02/2026"
pub fn date_label(dt: &DateTime<Tz>) -> String {
    let day = DAY_NAMES[dt.weekday().num_days_from_sunday() as usize];
    format!("{}, {:02}/{:02}/{}", day, dt.day(), dt.month(), dt.year())
}

/// "12.10" (id-ID 24-hour clock with dot separator)
pub fn time_label(dt: &DateTime<Tz>) -> String {
    format!("{:02}.{:02}", dt.hour(), dt.minute())
}

pub fn timestamp_from(dt: &DateTime<Tz>) -> TimeStamp {
    TimeStamp {
        date_label: date_label(dt),
        time_label: time_label(dt),
    }
}

/// The precision theme's own stamp: "9 Feb 2026 12.10.38" (day unpadded).
pub fn precision_stamp(dt: &DateTime<Tz>) -> String {
    format!(
        "{} {} {} {:02}.{:02}.{:02}",
        dt.day(),
        MONTH_ABBR[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}
