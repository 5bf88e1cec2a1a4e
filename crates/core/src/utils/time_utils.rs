use chrono::{DateTime, SubsecRound, Utc};

/// Current instant, truncated to milliseconds.
///
/// Stored timestamps carry millisecond precision so that a record read back
/// from storage compares equal to the value that was written.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
