//! Standard error messages and codes for consistent error responses.

pub const VALIDATION_FAILED: &str = "Request validation failed";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred.";
pub const NOT_FOUND_RESOURCE: &str = "Requested resource was not found.";

pub const CODE_VALIDATION: i32 = 1001;
pub const CODE_JSON_EXTRACTION: i32 = 1003;
pub const CODE_NOT_FOUND: i32 = 1004;
pub const CODE_INTERNAL: i32 = 1005;
pub const CODE_CONFLICT: i32 = 1008;
pub const CODE_UNAUTHORIZED: i32 = 1010;
pub const CODE_FORBIDDEN: i32 = 1011;
pub const CODE_DEPENDENCY: i32 = 1020;
