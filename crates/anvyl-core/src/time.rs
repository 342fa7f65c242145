//! Single call site for "now", so the monotonic-timestamp invariant
//! (timestamps monotonically increase within a single
//! service process") has one place to reason about.

/// Current UTC time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
