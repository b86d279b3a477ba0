//! Wall-clock access

/// Current Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Current Unix time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Local time zone offset east of UTC, in minutes
#[cfg(target_arch = "wasm32")]
pub fn local_offset_minutes() -> i32 {
    // getTimezoneOffset() is positive west of UTC
    -(js_sys::Date::new_0().get_timezone_offset() as i32)
}

/// Local time zone offset east of UTC, in minutes
#[cfg(not(target_arch = "wasm32"))]
pub fn local_offset_minutes() -> i32 {
    0
}
