//! Exit codes: 0 success, 1 generic failure, 2 invalid arguments,
//! 3 service not running, 4 backend unavailable.

pub const SUCCESS: i32 = 0;
pub const GENERIC_FAILURE: i32 = 1;
pub const INVALID_ARGUMENTS: i32 = 2;
pub const SERVICE_NOT_RUNNING: i32 = 3;
pub const BACKEND_UNAVAILABLE: i32 = 4;
