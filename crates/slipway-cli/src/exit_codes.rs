//! Standard exit codes for CLI operations

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Get error - listing published versions failed
pub const GET_ERROR: i32 = 2;

/// Config error - missing or invalid config file, bad target or flag set
pub const CONFIG_ERROR: i32 = 3;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
