//! Wall-clock helpers.

use time::OffsetDateTime;

/// Current UTC time truncated to whole seconds.
///
/// Every timestamp this service writes goes through here so values compare
/// consistently on backends that store them as text (SQLite).
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
