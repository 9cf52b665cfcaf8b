use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Today's date in the local timezone, falling back to UTC when the offset is unknown.
pub fn today_local() -> Date {
    OffsetDateTime::now_utc()
        .to_offset(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
        .date()
}

pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Parse a `YYYY-MM-DD` string. Returns `None` for anything else.
pub fn parse_iso_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), ISO_DATE).ok()
}

/// Move `date` by `days`, staying put if the result would be out of range.
pub fn shift_days(date: Date, days: i64) -> Date {
    date.checked_add(Duration::days(days)).unwrap_or(date)
}
