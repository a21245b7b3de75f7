//! Time formatting helpers.

/// Format a number of seconds as a `mm:ss` countdown.
///
/// Minutes are not wrapped into hours: 3600 seconds prints as `60:00`.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
