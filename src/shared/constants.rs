/// Default page size for admin listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 500;

// =============================================================================
// SCRIPTS
// =============================================================================

/// Prints the record with the largest size (or smallest with `-min`)
pub const SCRIPT_MAX_MIN_SIZE: &str = "max-min-size.sh";

/// Prints all records ordered by username (descending with `-desc`)
pub const SCRIPT_ORDER_BY_USERNAME: &str = "order-by-username.sh";

/// Prints records whose message count lies within `low..=high`
pub const SCRIPT_BETWEEN_MSGS: &str = "between-msgs.sh";

pub const FLAG_MIN: &str = "-min";
pub const FLAG_DESC: &str = "-desc";

// =============================================================================
// MESSAGES
// =============================================================================

pub const MSG_FILENAME_REQUIRED: &str = "filename query param is required";
pub const MSG_INVALID_FILENAME: &str = "Invalid filename. Allowed chars: A-Z, a-z, 0-9, -, _, .";
pub const MSG_FILE_NOT_FOUND: &str = "File not found";
pub const MSG_FILE_CREATED: &str = "File created";
pub const MSG_RANGE_REQUIRED: &str = "filename, low and high query params are required";
pub const MSG_RANGE_NOT_INTEGER: &str = "low and high must be integers";
pub const MSG_SCRIPT_NOT_FOUND: &str = "Script not found";
